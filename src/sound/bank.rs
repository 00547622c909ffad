use super::{Sound, SoundFamily, SoundSet};
use crate::error::{EngineError, EngineResult};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fetches one sample. Implementations decide where bytes come from.
pub trait SampleLoader {
    fn load(&self, path: &Path) -> impl Future<Output = EngineResult<Sound>> + Send;
}

/// Loads samples from the filesystem, relative to `root`.
#[derive(Debug, Clone)]
pub struct FileSampleLoader {
    root: PathBuf,
}

impl FileSampleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SampleLoader for FileSampleLoader {
    async fn load(&self, path: &Path) -> EngineResult<Sound> {
        let full_path = self.root.join(path);
        let data = tokio::fs::read(&full_path)
            .await
            .map_err(|source| EngineError::SampleLoad {
                path: full_path.clone(),
                source,
            })?;
        Ok(Sound::new(path.to_string_lossy(), data))
    }
}

/// Sample paths per family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundManifest {
    entries: Vec<(SoundFamily, Vec<PathBuf>)>,
}

impl SoundManifest {
    pub fn new(entries: Vec<(SoundFamily, Vec<PathBuf>)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(SoundFamily, Vec<PathBuf>)] {
        &self.entries
    }
}

impl Default for SoundManifest {
    /// The installation's sample set: 3 soft swooshes, 6 hard swooshes, 7 punches.
    fn default() -> Self {
        let paths = |stem: &str, count: usize| {
            (1..=count)
                .map(|i| PathBuf::from(format!("assets/audio/{stem}-{i:02}.ogg")))
                .collect::<Vec<_>>()
        };
        Self::new(vec![
            (SoundFamily::SoftSwoosh, paths("swoosh-soft", 3)),
            (SoundFamily::HardSwoosh, paths("swoosh-hard", 6)),
            (SoundFamily::Punch, paths("punch-hard", 7)),
        ])
    }
}

/// Every loaded sound set, keyed by family.
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    sets: HashMap<SoundFamily, SoundSet>,
}

impl SoundBank {
    pub fn new(sets: impl IntoIterator<Item = SoundSet>) -> Self {
        Self {
            sets: sets.into_iter().map(|set| (set.family(), set)).collect(),
        }
    }

    /// Loads every sample in the manifest concurrently. Fails on the first
    /// sample that cannot be loaded.
    pub async fn load<L: SampleLoader>(loader: &L, manifest: &SoundManifest) -> EngineResult<Self> {
        let sets = try_join_all(manifest.entries().iter().map(|(family, paths)| async move {
            let sounds = try_join_all(paths.iter().map(|path| loader.load(path))).await?;
            Ok::<_, EngineError>(SoundSet::new(*family, sounds))
        }))
        .await?;

        let bank = Self::new(sets);
        info!(
            families = bank.sets.len(),
            samples = bank.sets.values().map(|set| set.sounds().len()).sum::<usize>(),
            "sound bank loaded"
        );
        Ok(bank)
    }

    /// The set for `family`, if it was loaded.
    pub fn set(&self, family: SoundFamily) -> Option<&SoundSet> {
        self.sets.get(&family)
    }
}
