// THEORY:
// Reactions are the stateful consumers of the intensity vector. Each one maps
// the same per-region motion reading to a different output: a red wash over the
// picture (`visual`) or a spatialised sound effect (`audio`). They fan out from
// the analyzer independently; neither knows about the other.

pub mod audio;
pub mod visual;
