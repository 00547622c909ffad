use super::{AudioEngine, Pan, PlayRequest, Sound, SoundFamily};
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Clears its set's "is playing" latch when dropped.
#[derive(Debug)]
pub struct PlaybackGuard {
    latch: Arc<AtomicBool>,
}

impl PlaybackGuard {
    pub(crate) fn new(latch: Arc<AtomicBool>) -> Self {
        Self { latch }
    }

    /// Marks playback as complete.
    pub fn finish(self) {}
}

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        self.latch.store(false, Ordering::Release);
    }
}

/// Interchangeable variations of one sound effect. One is picked at random per
/// trigger, and the set will not retrigger while its last sample is sounding.
#[derive(Debug, Clone)]
pub struct SoundSet {
    family: SoundFamily,
    sounds: Vec<Sound>,
    playing: Arc<AtomicBool>,
}

impl SoundSet {
    pub fn new(family: SoundFamily, sounds: Vec<Sound>) -> Self {
        Self {
            family,
            sounds,
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn family(&self) -> SoundFamily {
        self.family
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Plays a random sample unless one is still sounding. Returns whether a
    /// sample was started.
    pub fn trigger(&self, volume: f32, pan: Pan, gain: f32, engine: &mut dyn AudioEngine) -> bool {
        if self.playing.swap(true, Ordering::AcqRel) {
            return false;
        }

        let Some(sound) = self.sounds.choose(&mut rand::rng()) else {
            self.playing.store(false, Ordering::Release);
            return false;
        };

        debug!(family = ?self.family, sample = %sound.name, volume, x = pan.x, y = pan.y, "sound triggered");
        let guard = PlaybackGuard::new(Arc::clone(&self.playing));
        engine.play(
            PlayRequest {
                family: self.family,
                sound,
                volume,
                pan,
                gain,
            },
            guard,
        );
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Engine that keeps every guard until told to release them.
    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub played: Vec<(SoundFamily, String, f32, Pan, f32)>,
        pub guards: Vec<PlaybackGuard>,
        /// Gain of every loop start and loop gain change, in order.
        pub loop_gains: Vec<f32>,
        pub loop_guard: Option<PlaybackGuard>,
        pub loops_stopped: usize,
    }

    impl AudioEngine for RecordingEngine {
        fn play(&mut self, request: PlayRequest<'_>, guard: PlaybackGuard) {
            self.played.push((
                request.family,
                request.sound.name.clone(),
                request.volume,
                request.pan,
                request.gain,
            ));
            self.guards.push(guard);
        }

        fn play_loop(&mut self, _track: &Sound, gain: f32, guard: PlaybackGuard) {
            self.loop_gains.push(gain);
            self.loop_guard = Some(guard);
        }

        fn set_loop_gain(&mut self, gain: f32) {
            self.loop_gains.push(gain);
        }

        fn stop_loop(&mut self) {
            self.loop_guard = None;
            self.loops_stopped += 1;
        }
    }

    impl RecordingEngine {
        pub fn finish_all(&mut self) {
            self.guards.drain(..).for_each(PlaybackGuard::finish);
        }
    }

    pub(crate) fn set_of(family: SoundFamily, count: usize) -> SoundSet {
        let sounds = (0..count)
            .map(|i| Sound::new(format!("{family:?}-{i}"), vec![i as u8]))
            .collect();
        SoundSet::new(family, sounds)
    }

    #[test]
    fn latch_blocks_overlapping_triggers() {
        let set = set_of(SoundFamily::Punch, 3);
        let mut engine = RecordingEngine::default();

        assert!(set.trigger(0.8, Pan::default(), 1.0, &mut engine));
        assert!(set.is_playing());
        assert!(!set.trigger(0.9, Pan::default(), 1.0, &mut engine));
        assert_eq!(engine.played.len(), 1);

        engine.finish_all();
        assert!(!set.is_playing());
        assert!(set.trigger(0.9, Pan::default(), 1.0, &mut engine));
        assert_eq!(engine.played.len(), 2);
    }

    #[test]
    fn chosen_sample_belongs_to_the_set() {
        let set = set_of(SoundFamily::HardSwoosh, 6);
        let mut engine = RecordingEngine::default();
        for _ in 0..20 {
            set.trigger(0.5, Pan { x: 1, y: -1 }, 3.0, &mut engine);
            engine.finish_all();
        }
        assert_eq!(engine.played.len(), 20);
        assert!(
            engine
                .played
                .iter()
                .all(|(family, name, _, _, gain)| *family == SoundFamily::HardSwoosh
                    && set.sounds().iter().any(|s| &s.name == name)
                    && *gain == 3.0)
        );
    }

    #[test]
    fn empty_set_never_latches() {
        let set = SoundSet::new(SoundFamily::SoftSwoosh, Vec::new());
        let mut engine = RecordingEngine::default();
        assert!(!set.trigger(0.5, Pan::default(), 1.0, &mut engine));
        assert!(!set.is_playing());
    }
}
