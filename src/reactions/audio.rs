// THEORY:
// `AudioReaction` picks at most one sound effect per frame from the intensity
// vector and places it in the stereo field according to where the motion was.
//
// Three tiers are evaluated independently over every region: soft swoosh (>30),
// hard swoosh (>50) and punch (>60). Whenever a region passes a tier, that
// tier's volume and pan are overwritten with the region's, so the last
// qualifying region by index wins, not the strongest one. Afterwards only the
// heaviest triggered tier plays.
//
// The pan mapping assumes the default 3x3 grid: the row picks the vertical
// position and the column the horizontal one.

use crate::core_modules::motion_analyzer::IntensityVector;
use crate::sound::{AudioEngine, Pan, SoundBank, SoundFamily};
use tracing::{debug, warn};

/// A tier that fired, with the volume and pan of its last qualifying region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierTrigger {
    pub family: SoundFamily,
    /// Intensity of the region divided by 100.
    pub volume: f64,
    pub pan: Pan,
    pub region: usize,
}

/// Maps a region index of a 3-column grid to a pan position.
///
/// Rows 0..=2 are at the top (`y = -1`), 3..=5 in the middle, everything after
/// at the bottom. Columns map left, centre, right. Only meaningful for 3x3.
pub fn region_to_coordinates(index: usize) -> Pan {
    let y = if index <= 2 {
        -1
    } else if index <= 5 {
        0
    } else {
        1
    };

    let x = if index % 3 == 0 {
        -1
    } else if (index - 1) % 3 == 0 {
        0
    } else {
        1
    };

    Pan { x, y }
}

/// Evaluates every tier and applies the priority punch > hard swoosh > soft swoosh.
pub fn select_trigger(intensities: &IntensityVector) -> Option<TierTrigger> {
    let mut fired: [Option<TierTrigger>; 3] = [None; 3];

    for (region, value) in intensities.iter().enumerate() {
        for (slot, family) in SoundFamily::ALL.into_iter().enumerate() {
            if value > family.threshold() {
                fired[slot] = Some(TierTrigger {
                    family,
                    volume: value / 100.0,
                    pan: region_to_coordinates(region),
                    region,
                });
            }
        }
    }

    fired.into_iter().rev().flatten().next()
}

#[derive(Debug, Clone)]
pub struct AudioReaction {
    /// Master gain handed to the engine with every trigger.
    gain: f32,
}

impl Default for AudioReaction {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

impl AudioReaction {
    /// Creates the reaction for a grid of `columns` x `rows` regions.
    pub fn new(columns: u32, rows: u32) -> Self {
        if (columns, rows) != (3, 3) {
            warn!(columns, rows, "sound panning assumes a 3x3 region grid");
        }
        Self::default()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    /// Selects the sound for this frame and triggers it on the matching set.
    /// A missing bank or family makes the trigger a no-op.
    pub fn generate(
        &self,
        intensities: &IntensityVector,
        bank: Option<&SoundBank>,
        engine: &mut dyn AudioEngine,
    ) -> Option<TierTrigger> {
        let trigger = select_trigger(intensities)?;

        match bank.and_then(|bank| bank.set(trigger.family)) {
            Some(set) => {
                set.trigger(trigger.volume as f32, trigger.pan, self.gain, engine);
            }
            None => debug!(family = ?trigger.family, "sound set not loaded, skipping trigger"),
        }

        Some(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::SoundSet;
    use crate::sound::sound_set::tests::{RecordingEngine, set_of};

    fn vector(values: [f64; 9]) -> IntensityVector {
        IntensityVector::from(values.to_vec())
    }

    fn full_bank() -> SoundBank {
        SoundBank::new(SoundFamily::ALL.map(|family| set_of(family, 3)))
    }

    #[test]
    fn pan_covers_the_three_by_three_grid() {
        let expected = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (0, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        for (index, (x, y)) in expected.into_iter().enumerate() {
            assert_eq!(region_to_coordinates(index), Pan { x, y }, "region {index}");
        }
    }

    #[test]
    fn punch_wins_over_swooshes() {
        let trigger = select_trigger(&vector([10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 75.0]))
            .expect("a tier fires");
        assert_eq!(trigger.family, SoundFamily::Punch);
        assert_eq!(trigger.pan, Pan { x: 1, y: 1 });
        assert_eq!(trigger.volume, 0.75);
    }

    #[test]
    fn last_qualifying_region_wins_not_the_strongest() {
        let trigger = select_trigger(&vector([95.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 61.0, 0.0]))
            .expect("a tier fires");
        assert_eq!(trigger.family, SoundFamily::Punch);
        assert_eq!(trigger.region, 7);
        assert_eq!(trigger.volume, 0.61);
        assert_eq!(trigger.pan, Pan { x: 0, y: 1 });
    }

    #[test]
    fn tiers_use_strict_thresholds() {
        assert_eq!(select_trigger(&vector([30.0; 9])), None);

        let soft = select_trigger(&vector([31.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])).expect("soft fires");
        assert_eq!(soft.family, SoundFamily::SoftSwoosh);
        assert_eq!(soft.volume, 0.31);

        let hard = select_trigger(&vector([60.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])).expect("hard fires");
        assert_eq!(hard.family, SoundFamily::HardSwoosh);
    }

    #[test]
    fn generate_plays_only_the_selected_family() {
        let reaction = AudioReaction::new(3, 3);
        let bank = full_bank();
        let mut engine = RecordingEngine::default();

        reaction.generate(
            &vector([10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 75.0]),
            Some(&bank),
            &mut engine,
        );

        assert_eq!(engine.played.len(), 1);
        let (family, _, volume, pan, gain) = &engine.played[0];
        assert_eq!(*family, SoundFamily::Punch);
        assert_eq!(*volume, 0.75);
        assert_eq!(*pan, Pan { x: 1, y: 1 });
        assert_eq!(*gain, 1.0);
        assert!(!bank.set(SoundFamily::HardSwoosh).is_some_and(SoundSet::is_playing));
        assert!(!bank.set(SoundFamily::SoftSwoosh).is_some_and(SoundSet::is_playing));
    }

    #[test]
    fn playing_family_is_not_retriggered() {
        let mut reaction = AudioReaction::new(3, 3);
        reaction.set_gain(3.0);
        let bank = full_bank();
        let mut engine = RecordingEngine::default();
        let motion = vector([0.0, 0.0, 0.0, 0.0, 70.0, 0.0, 0.0, 0.0, 0.0]);

        reaction.generate(&motion, Some(&bank), &mut engine);
        reaction.generate(&motion, Some(&bank), &mut engine);
        assert_eq!(engine.played.len(), 1);
        assert_eq!(engine.played[0].4, 3.0);

        engine.finish_all();
        reaction.generate(&motion, Some(&bank), &mut engine);
        assert_eq!(engine.played.len(), 2);
    }

    #[test]
    fn missing_sets_are_a_no_op() {
        let reaction = AudioReaction::default();
        let mut engine = RecordingEngine::default();
        let motion = vector([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 99.0]);

        let trigger = reaction.generate(&motion, None, &mut engine);
        assert_eq!(trigger.map(|t| t.family), Some(SoundFamily::Punch));
        assert!(engine.played.is_empty());

        let partial = SoundBank::new(vec![set_of(SoundFamily::SoftSwoosh, 1)]);
        reaction.generate(&motion, Some(&partial), &mut engine);
        assert!(engine.played.is_empty());
    }

    #[test]
    fn quiet_frames_trigger_nothing() {
        let reaction = AudioReaction::default();
        let mut engine = RecordingEngine::default();
        assert!(reaction.generate(&IntensityVector::zeros(9), None, &mut engine).is_none());
    }
}
