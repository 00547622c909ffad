// THEORY:
// The `MotionAnalyzer` is the core of the installation. Every other component
// (the red wash, the sound effects, the debug overlay) consumes its output and
// nothing else.
//
// Each call to `analyze` runs the same short pipeline:
// 1.  **Resample** the incoming camera frame to the working resolution.
// 2.  **Difference** it against the cached previous frame through the
//     `FrameDiffer`, producing a binary change mask.
// 3.  **Cache** the new frame (the frame itself, never the mask) for the next call.
// 4.  **Aggregate** the mask through the `RegionGrid` into the percentage of
//     changed pixels per region.
//
// The first call has nothing to compare against, so the cache is seeded with
// the frame itself and the result is all zeros. A frame whose size does not
// match the cache is not an error: it yields zero motion for that call and
// is logged, so one bad frame never stops the show.

use crate::config::{AnalyzerConfig, AnalyzerOptions, merge_options};
use crate::core_modules::frame::{Frame, Mask};
use crate::core_modules::frame_differ::FrameDiffer;
use crate::core_modules::region_grid::RegionGrid;
use crate::error::EngineResult;
use tracing::{info, warn};

/// Percentage (0..=100) of changed pixels per region, in region order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntensityVector(Vec<f64>);

impl IntensityVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, region: usize) -> Option<f64> {
        self.0.get(region).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Highest regional intensity, or 0 for an empty vector.
    pub fn peak(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

impl From<Vec<f64>> for IntensityVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Frame-to-frame motion analyzer owning the previous-frame cache and the grid.
#[derive(Debug)]
pub struct MotionAnalyzer {
    config: AnalyzerConfig,
    grid: RegionGrid,
    previous_frame: Option<Frame>,
    /// Mask of the most recent call, retained only when debug output was requested.
    last_mask: Option<Mask>,
}

impl MotionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> EngineResult<Self> {
        config.validate()?;
        let grid = RegionGrid::new(
            config.width,
            config.height,
            config.horizontal_regions,
            config.vertical_regions,
        )?;

        info!(
            width = config.width,
            height = config.height,
            regions = grid.len(),
            sensitivity = config.sensitivity,
            "motion analyzer ready"
        );

        Ok(Self {
            config,
            grid,
            previous_frame: None,
            last_mask: None,
        })
    }

    /// Builds an analyzer from a partial options record merged over the defaults.
    pub fn with_options(options: &AnalyzerOptions) -> EngineResult<Self> {
        Self::new(merge_options(options, &AnalyzerConfig::default()))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    pub fn sensitivity(&self) -> u8 {
        self.config.sensitivity
    }

    /// Sets the differ threshold. Values outside `0..=100` are ignored.
    pub fn set_sensitivity(&mut self, value: i64) {
        self.config.set_sensitivity(value);
    }

    /// The mask of the last `analyze` call made with `emit_debug` set.
    pub fn last_mask(&self) -> Option<&Mask> {
        self.last_mask.as_ref()
    }

    /// Resamples `frame` to the working resolution and analyzes it.
    pub fn analyze(&mut self, frame: &Frame, emit_debug: bool) -> IntensityVector {
        let scaled = frame.scaled_to(self.config.width, self.config.height);
        self.analyze_prescaled(scaled, emit_debug)
    }

    /// Analyzes a frame that is expected to already be at the working resolution.
    pub fn analyze_prescaled(&mut self, frame: Frame, emit_debug: bool) -> IntensityVector {
        let mask = if frame.width() != self.config.width || frame.height() != self.config.height {
            warn!(
                frame_width = frame.width(),
                frame_height = frame.height(),
                working_width = self.config.width,
                working_height = self.config.height,
                "frame is not at the working resolution, reporting no motion"
            );
            None
        } else {
            let previous = self.previous_frame.as_ref().unwrap_or(&frame);
            let mask = FrameDiffer::diff(&frame, previous, self.config.sensitivity);
            if mask.is_none() {
                warn!(
                    current_bytes = frame.as_bytes().len(),
                    previous_bytes = previous.as_bytes().len(),
                    "frame size changed since the previous call, reporting no motion"
                );
            }
            mask
        };

        self.previous_frame = Some(frame);

        let intensities = match &mask {
            Some(mask) => self.aggregate(mask),
            None => IntensityVector::zeros(self.grid.len()),
        };

        self.last_mask = if emit_debug { mask } else { None };
        intensities
    }

    /// Counts changed pixels per region and converts the counts to percentages.
    fn aggregate(&self, mask: &Mask) -> IntensityVector {
        let mut changed_by_region = vec![0u32; self.grid.len()];
        for pixel_index in mask.changed_indices() {
            if let Some(region) = self.grid.region_index_of(pixel_index) {
                changed_by_region[region] += 1;
            }
        }

        let pixels_per_region = self.grid.pixels_per_region() as f64;
        IntensityVector(
            changed_by_region
                .into_iter()
                .map(|count| count as f64 / pixels_per_region * 100.0)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    fn analyzer(width: u32, height: u32, sensitivity: i64) -> MotionAnalyzer {
        MotionAnalyzer::with_options(&AnalyzerOptions {
            width: Some(width),
            height: Some(height),
            sensitivity: Some(sensitivity as f64),
            ..Default::default()
        })
        .expect("valid analyzer")
    }

    #[test]
    fn first_call_reports_no_motion() {
        let mut analyzer = analyzer(300, 300, 50);
        let frame = Frame::from_fn(300, 300, |x, y| Pixel::gray(((x * 7 + y * 13) % 256) as u8));
        let intensities = analyzer.analyze(&frame, false);
        assert_eq!(intensities, IntensityVector::zeros(9));
    }

    #[test]
    fn full_frame_motion_saturates_every_region() {
        let mut analyzer = analyzer(300, 300, 50);
        analyzer.analyze(&Frame::filled(300, 300, Pixel::BLACK), false);
        let intensities = analyzer.analyze(&Frame::filled(300, 300, Pixel::WHITE), false);
        assert_eq!(intensities.len(), 9);
        assert!(intensities.iter().all(|v| v == 100.0));
    }

    #[test]
    fn identical_frames_report_no_motion_at_any_sensitivity() {
        for sensitivity in [0, 50, 100] {
            let mut analyzer = analyzer(300, 300, sensitivity);
            let frame = Frame::from_fn(300, 300, |x, _| Pixel::gray((x % 256) as u8));
            analyzer.analyze(&frame, false);
            let intensities = analyzer.analyze(&frame, false);
            assert!(intensities.iter().all(|v| v == 0.0));
        }
    }

    #[test]
    fn motion_is_attributed_to_its_region() {
        let mut analyzer = analyzer(300, 300, 50);
        analyzer.analyze(&Frame::filled(300, 300, Pixel::BLACK), false);

        // The lower half of the bottom-right region. Column 0 is lit as well
        // because the first pixel of each row is attributed to the last column.
        let frame = Frame::from_fn(300, 300, |x, y| {
            if (x > 200 || x == 0) && y >= 250 { Pixel::WHITE } else { Pixel::BLACK }
        });
        let intensities = analyzer.analyze(&frame, false);
        // 100 columns x 50 rows, out of 100 x 100.
        assert_eq!(intensities.get(8), Some(50.0));
        assert_eq!(intensities.iter().filter(|v| *v > 0.0).count(), 1);
    }

    #[test]
    fn cache_holds_the_frame_not_the_mask() {
        let mut analyzer = analyzer(300, 300, 50);
        analyzer.analyze(&Frame::filled(300, 300, Pixel::BLACK), false);
        analyzer.analyze(&Frame::filled(300, 300, Pixel::WHITE), false);
        // White again: compared to the cached white frame, nothing moved.
        let intensities = analyzer.analyze(&Frame::filled(300, 300, Pixel::WHITE), false);
        assert!(intensities.iter().all(|v| v == 0.0));
    }

    #[test]
    fn frames_are_resampled_to_the_working_resolution() {
        let mut analyzer = analyzer(30, 30, 50);
        analyzer.analyze(&Frame::filled(120, 90, Pixel::BLACK), false);
        let intensities = analyzer.analyze(&Frame::filled(120, 90, Pixel::WHITE), false);
        assert!(intensities.iter().all(|v| v == 100.0));
    }

    #[test]
    fn wrong_size_frames_degrade_to_no_motion_and_recover() {
        let mut analyzer = analyzer(30, 30, 50);
        analyzer.analyze_prescaled(Frame::filled(30, 30, Pixel::BLACK), false);

        let intensities = analyzer.analyze_prescaled(Frame::filled(20, 20, Pixel::WHITE), false);
        assert_eq!(intensities, IntensityVector::zeros(9));

        // The cache now holds a 20x20 frame, so the next proper frame mismatches too.
        let intensities = analyzer.analyze_prescaled(Frame::filled(30, 30, Pixel::WHITE), false);
        assert_eq!(intensities, IntensityVector::zeros(9));

        let intensities = analyzer.analyze_prescaled(Frame::filled(30, 30, Pixel::BLACK), false);
        assert!(intensities.iter().all(|v| v == 100.0));
    }

    #[test]
    fn sensitivity_updates_respect_the_range() {
        let mut analyzer = analyzer(30, 30, 50);
        analyzer.set_sensitivity(10);
        assert_eq!(analyzer.sensitivity(), 10);
        analyzer.set_sensitivity(101);
        assert_eq!(analyzer.sensitivity(), 10);
        analyzer.set_sensitivity(-1);
        assert_eq!(analyzer.sensitivity(), 10);
    }

    #[test]
    fn sensitivity_drives_the_threshold() {
        let mut analyzer = analyzer(30, 30, 50);
        analyzer.analyze(&Frame::filled(30, 30, Pixel::gray(100)), false);
        let intensities = analyzer.analyze(&Frame::filled(30, 30, Pixel::gray(150)), false);
        assert!(intensities.iter().all(|v| v == 0.0));

        analyzer.set_sensitivity(49);
        let intensities = analyzer.analyze(&Frame::filled(30, 30, Pixel::gray(100)), false);
        assert!(intensities.iter().all(|v| v == 100.0));
    }

    #[test]
    fn mask_is_kept_only_when_debug_is_requested() {
        let mut analyzer = analyzer(30, 30, 50);
        analyzer.analyze(&Frame::filled(30, 30, Pixel::BLACK), true);
        assert_eq!(analyzer.last_mask().map(Mask::changed_count), Some(0));

        analyzer.analyze(&Frame::filled(30, 30, Pixel::WHITE), true);
        assert_eq!(analyzer.last_mask().map(Mask::changed_count), Some(900));

        analyzer.analyze(&Frame::filled(30, 30, Pixel::BLACK), false);
        assert!(analyzer.last_mask().is_none());
    }

    #[test]
    fn remainder_pixels_do_not_count() {
        let mut analyzer = analyzer(32, 30, 50);
        analyzer.analyze_prescaled(Frame::filled(32, 30, Pixel::BLACK), false);
        let intensities = analyzer.analyze_prescaled(Frame::filled(32, 30, Pixel::WHITE), false);
        // Regions are 10x10; the two remainder columns never reach a region.
        assert!(intensities.iter().all(|v| v == 100.0));
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let result = MotionAnalyzer::with_options(&AnalyzerOptions {
            horizontal_regions: Some(0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn peak_is_the_largest_value() {
        let vector = IntensityVector::from(vec![10.0, 75.0, 30.0]);
        assert_eq!(vector.peak(), 75.0);
        assert_eq!(IntensityVector::default().peak(), 0.0);
    }
}
