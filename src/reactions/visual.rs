// THEORY:
// `VisualReaction` turns motion into a pulsing red flash. Strong motion builds up
// an `activity` reservoir; once it overflows, the wash snaps to fully opaque and
// then fades out over roughly a hundred frames. Sustained motion keeps
// refilling the reservoir, so a busy scene pulses rather than staying red.

use crate::core_modules::motion_analyzer::IntensityVector;
use crate::surface::{BlendMode, RenderSurface, Rgba};
use tracing::debug;

/// Activity that must be exceeded to trigger a flash; also the amount consumed by one.
const ACTIVITY_THRESHOLD: f64 = 100.0;
/// Peaks above this add a full threshold worth of activity.
const SHARP_PEAK: f64 = 90.0;
/// Peaks above this add their own value to the activity.
const STRONG_PEAK: f64 = 70.0;
const ALPHA_DECAY: f64 = 0.01;
const ALPHA_FLOOR: f64 = 0.05;
const ACTIVITY_DECAY: f64 = 10.0;
const ACTIVITY_FLOOR: f64 = 5.0;

/// The wash color, `hsl(0, 100%, 50%)`.
const WASH: (u8, u8, u8) = (255, 0, 0);

#[derive(Debug, Clone, Default)]
pub struct VisualReaction {
    activity: f64,
    alpha: f64,
}

impl VisualReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activity(&self) -> f64 {
        self.activity
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feeds one intensity vector: accumulate, maybe trigger, render, decay.
    pub fn update(&mut self, intensities: &IntensityVector, surface: &mut dyn RenderSurface) {
        self.accumulate(intensities.peak());

        if self.alpha > 0.0 {
            let (width, height) = surface.size();
            let (red, green, blue) = WASH;
            surface.fill_rect(
                0,
                0,
                width,
                height,
                Rgba::new(red, green, blue, self.alpha as f32),
                BlendMode::Darken,
            );
        }

        self.decay();
    }

    fn accumulate(&mut self, peak: f64) {
        if peak > SHARP_PEAK {
            self.activity += ACTIVITY_THRESHOLD;
        } else if peak > STRONG_PEAK {
            self.activity += peak;
        }

        if self.activity > ACTIVITY_THRESHOLD {
            self.activity -= ACTIVITY_THRESHOLD;
            self.alpha = 1.0;
            debug!(peak, "red wash triggered");
        }
    }

    fn decay(&mut self) {
        if self.alpha > ALPHA_FLOOR {
            self.alpha -= ALPHA_DECAY;
        } else {
            self.alpha = 0.0;
        }

        if self.activity > ACTIVITY_FLOOR {
            self.activity -= ACTIVITY_DECAY;
        } else {
            self.activity = 0.0;
        }
    }
}
