// THEORY:
// This file is the main entry point for the `heavenly_glory` library crate.
// It defines the public API consumed by a UI shell (the browser installation or
// the `visual_tester` binary).
//
// The primary export is the `Stage`, which ties the motion analysis core to its
// two reactions (the red visual wash and the spatial sound effects) and to the
// optional debug overlay. The lower layers (`core_modules`) stay public so the
// analyzer can be driven on its own, without any rendering or audio concerns.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod reactions;
pub mod sound;
pub mod stage;
pub mod surface;

pub use config::{AnalyzerConfig, AnalyzerOptions, DeploymentProfile, merge_options};
pub use core_modules::frame::{Frame, Mask};
pub use core_modules::motion_analyzer::{IntensityVector, MotionAnalyzer};
pub use core_modules::region_grid::{Region, RegionGrid};
pub use error::{EngineError, EngineResult};
pub use stage::Stage;
