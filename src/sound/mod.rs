// THEORY:
// The `sound` module is the boundary between the motion core and the audio
// engine that actually plays samples. Decoding and spatial playback belong to
// the shell; this side only knows:
//
// - which sample families exist (`SoundFamily`) and where a sound should sit in
//   the stereo field (`Pan`),
// - how a family of interchangeable samples refuses to overlap itself
//   (`SoundSet` and its `PlaybackGuard` latch),
// - how the families are loaded up front, asynchronously, into a `SoundBank`
//   before the first frame is analyzed,
// - and the single background track (`MusicLoop`) that loops from the moment
//   capture starts until it is faded out.

pub mod bank;
pub mod music;
pub mod sound_set;

pub use bank::{FileSampleLoader, SampleLoader, SoundBank, SoundManifest};
pub use music::MusicLoop;
pub use sound_set::{PlaybackGuard, SoundSet};

use std::sync::Arc;

/// The three families of sound effects, from the lightest trigger to the heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundFamily {
    SoftSwoosh,
    HardSwoosh,
    Punch,
}

impl SoundFamily {
    /// In ascending trigger threshold.
    pub const ALL: [SoundFamily; 3] = [SoundFamily::SoftSwoosh, SoundFamily::HardSwoosh, SoundFamily::Punch];

    /// Regional intensity that must be exceeded for the family to trigger.
    pub fn threshold(self) -> f64 {
        match self {
            SoundFamily::SoftSwoosh => 30.0,
            SoundFamily::HardSwoosh => 50.0,
            SoundFamily::Punch => 60.0,
        }
    }
}

/// Discrete position relative to the centre of the sound area, each axis in `-1..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pan {
    pub x: i8,
    pub y: i8,
}

/// An opaque, already loaded audio sample. Decoding happens in the audio engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl Sound {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Everything the audio engine needs to start one sample.
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    pub family: SoundFamily,
    pub sound: &'a Sound,
    /// Per-trigger volume in `0.0..=1.0`.
    pub volume: f32,
    pub pan: Pan,
    /// Master gain applied on top of `volume`.
    pub gain: f32,
}

/// The shell's audio output. The engine must keep `guard` alive until the
/// sample has finished playing, then drop it (or call `finish`).
pub trait AudioEngine {
    fn play(&mut self, request: PlayRequest<'_>, guard: PlaybackGuard);

    /// Starts `track` looping at `gain`. The guard is held until `stop_loop`.
    fn play_loop(&mut self, track: &Sound, gain: f32, guard: PlaybackGuard);

    /// Changes the gain of the running loop, if any.
    fn set_loop_gain(&mut self, gain: f32);

    /// Stops the running loop and drops its guard.
    fn stop_loop(&mut self);
}
