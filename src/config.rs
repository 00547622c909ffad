// THEORY:
// The analyzer is configured once, from a single options record supplied by the
// UI shell. Any key may be missing (it falls back to the defaults) and unknown
// keys are ignored. Two shapes express that contract:
//
// - `AnalyzerOptions` is the loose, partially filled record as it arrives from
//   the shell (every field optional, deserializable from JSON).
// - `AnalyzerConfig` is the fully populated, typed record the engine works with.
//
// `merge_options` is the pure bridge between them.

use crate::error::{EngineError, EngineResult};
use serde::Deserialize;

/// Upper bound (inclusive) of the sensitivity threshold.
pub const MAX_SENSITIVITY: u8 = 100;

/// The supplied, possibly incomplete options record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub horizontal_regions: Option<u32>,
    pub vertical_regions: Option<u32>,
    /// Luminance delta threshold, meaningful in `0..=100`. Any JSON number is
    /// accepted so that fractional or out-of-range input survives parsing and
    /// is resolved by `merge_options` instead.
    pub sensitivity: Option<f64>,
    pub display_debug_canvas: Option<bool>,
}

/// Working resolution presets. The installation ran at either size depending
/// on where it was deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentProfile {
    /// 320x240 working resolution.
    #[default]
    Compact,
    /// 640x480 working resolution.
    Standard,
}

/// Fully resolved analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Working width in pixels; frames are resampled to it before analysis.
    pub width: u32,
    /// Working height in pixels.
    pub height: u32,
    /// Number of region columns.
    pub horizontal_regions: u32,
    /// Number of region rows.
    pub vertical_regions: u32,
    /// Minimum luminance delta (exclusive) for a pixel to count as changed.
    pub sensitivity: u8,
    /// Whether a debug overlay should be created at all.
    pub display_debug_canvas: bool,
}

impl DeploymentProfile {
    pub fn defaults(self) -> AnalyzerConfig {
        let (width, height) = match self {
            DeploymentProfile::Compact => (320, 240),
            DeploymentProfile::Standard => (640, 480),
        };
        AnalyzerConfig {
            width,
            height,
            horizontal_regions: 3,
            vertical_regions: 3,
            sensitivity: 50,
            display_debug_canvas: true,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        DeploymentProfile::Compact.defaults()
    }
}

impl AnalyzerConfig {
    /// Parses a JSON options record and merges it over the compact defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let options: AnalyzerOptions = serde_json::from_str(json)?;
        let config = merge_options(&options, &AnalyzerConfig::default());
        config.validate()?;
        Ok(config)
    }

    /// Updates the sensitivity if `value` lies in `0..=100`; anything else is
    /// silently ignored.
    pub fn set_sensitivity(&mut self, value: i64) {
        if is_valid_sensitivity(value) {
            self.sensitivity = value as u8;
        }
    }

    /// Rejects a zero-sized working resolution. Grid feasibility is checked
    /// when the `RegionGrid` is built.
    pub fn validate(&self) -> EngineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "working resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Returns `true` when `value` is an acceptable sensitivity threshold.
pub fn is_valid_sensitivity(value: i64) -> bool {
    (0..=MAX_SENSITIVITY as i64).contains(&value)
}

/// Merges the supplied options over `defaults`. Missing keys keep the default.
/// An out-of-range sensitivity is ignored the same way `set_sensitivity` ignores it.
pub fn merge_options(supplied: &AnalyzerOptions, defaults: &AnalyzerConfig) -> AnalyzerConfig {
    // Deltas are integers, so `delta > 50.5` and `delta > 50` select the same
    // pixels; truncating loses nothing.
    let sensitivity = match supplied.sensitivity {
        Some(value) if (0.0..=MAX_SENSITIVITY as f64).contains(&value) => value.trunc() as u8,
        _ => defaults.sensitivity,
    };

    AnalyzerConfig {
        width: supplied.width.unwrap_or(defaults.width),
        height: supplied.height.unwrap_or(defaults.height),
        horizontal_regions: supplied.horizontal_regions.unwrap_or(defaults.horizontal_regions),
        vertical_regions: supplied.vertical_regions.unwrap_or(defaults.vertical_regions),
        sensitivity,
        display_debug_canvas: supplied
            .display_debug_canvas
            .unwrap_or(defaults.display_debug_canvas),
    }
}
