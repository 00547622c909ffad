// THEORY:
// The installation plays one background track underneath the effects. It
// starts looping when capture starts and runs until the show is wound down,
// at which point it fades out in coarse steps and stops.
//
// The loop shares the effects' audio seam: the engine receives a
// `PlaybackGuard` with the track, and the guard's latch tells the loop whether
// the engine still considers it running.

use super::{AudioEngine, PlaybackGuard, SampleLoader, Sound};
use crate::error::EngineResult;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Track path relative to the asset root.
pub const MUSIC_TRACK: &str = "assets/audio/music-loop-01.ogg";
/// Volume the installation started the music at.
pub const DEFAULT_MUSIC_VOLUME: f32 = 0.5;
/// Gain removed by each fade step.
pub const FADE_STEP: f32 = 0.05;
/// Time between fade steps.
pub const FADE_INTERVAL: Duration = Duration::from_millis(700);

#[derive(Debug)]
pub struct MusicLoop {
    track: Sound,
    gain: f32,
    playing: Arc<AtomicBool>,
}

impl MusicLoop {
    /// `initial_volume` is clamped to `0.0..=1.0`.
    pub fn new(track: Sound, initial_volume: f32) -> Self {
        Self {
            track,
            gain: initial_volume.clamp(0.0, 1.0),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn load<L: SampleLoader>(
        loader: &L,
        path: impl AsRef<Path>,
        initial_volume: f32,
    ) -> EngineResult<Self> {
        let track = loader.load(path.as_ref()).await?;
        info!(track = %track.name, initial_volume, "music loaded");
        Ok(Self::new(track, initial_volume))
    }

    pub fn track(&self) -> &Sound {
        &self.track
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Starts the loop at the current gain. Returns `false` if it is already running.
    pub fn play(&self, engine: &mut dyn AudioEngine) -> bool {
        if self.playing.swap(true, Ordering::AcqRel) {
            return false;
        }
        engine.play_loop(&self.track, self.gain, PlaybackGuard::new(Arc::clone(&self.playing)));
        true
    }

    /// Sets the gain if `value` lies in `0.0..=1.0`; anything else is ignored.
    /// Returns whether the value was applied.
    pub fn set_volume(&mut self, value: f32, engine: &mut dyn AudioEngine) -> bool {
        if !(0.0..=1.0).contains(&value) {
            return false;
        }
        self.gain = value;
        if self.is_playing() {
            engine.set_loop_gain(value);
        }
        true
    }

    pub fn stop(&mut self, engine: &mut dyn AudioEngine) {
        if self.is_playing() {
            engine.stop_loop();
        }
    }

    /// One step of the fade: lowers the gain by `FADE_STEP` while a full step
    /// remains, otherwise stops the loop. Returns `true` while the fade goes on.
    pub fn fade_step(&mut self, engine: &mut dyn AudioEngine) -> bool {
        if FADE_STEP <= self.gain {
            let lowered = (self.gain - FADE_STEP).max(0.0);
            self.set_volume(lowered, engine);
            true
        } else {
            self.stop(engine);
            false
        }
    }

    /// Runs `fade_step` every `period` until the loop stops. The first step
    /// is taken immediately.
    pub async fn fade_out(&mut self, period: Duration, engine: &mut dyn AudioEngine) {
        let mut interval = tokio::time::interval(period);
        let mut steps = 0u32;
        loop {
            interval.tick().await;
            if !self.fade_step(engine) {
                break;
            }
            steps += 1;
        }
        debug!(steps, "music faded out");
    }
}
