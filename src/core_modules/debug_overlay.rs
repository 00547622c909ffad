// THEORY:
// The `DebugOverlayRenderer` exists for tuning the installation on site. It
// draws the binary change mask and, over it, one translucent rectangle per
// region whose opacity follows the strongest motion recently seen there.
//
// That "afterglow" is the only state it keeps: a per-region maximum that jumps
// up to any stronger reading and otherwise decays by a fixed step per render,
// so a brief spike stays visible long enough for a human to notice it. The
// renderer is a pure consumer of the analyzer's output and the analyzer knows
// nothing about it.

use crate::core_modules::frame::Mask;
use crate::core_modules::motion_analyzer::IntensityVector;
use crate::core_modules::region_grid::RegionGrid;
use crate::surface::{BlendMode, RenderSurface, Rgba};

/// Afterglow loss per render once a region is above the floor.
const AFTERGLOW_DECAY: f64 = 2.0;
/// Afterglow at or below this level no longer decays.
const AFTERGLOW_FLOOR: f64 = 5.0;

const REGION_FILL: (u8, u8, u8) = (255, 100, 100);
const REGION_STROKE: Rgba = Rgba::new(255, 0, 0, 1.0);

#[derive(Debug, Clone)]
pub struct DebugOverlayRenderer {
    /// Decaying maximum intensity per region.
    max_intensity_seen: Vec<f64>,
}

impl DebugOverlayRenderer {
    pub fn new(region_count: usize) -> Self {
        Self {
            max_intensity_seen: vec![0.0; region_count],
        }
    }

    pub fn max_intensity_seen(&self) -> &[f64] {
        &self.max_intensity_seen
    }

    /// Draws the mask (when present) and the region afterglow, then decays it.
    pub fn render(
        &mut self,
        surface: &mut dyn RenderSurface,
        grid: &RegionGrid,
        mask: Option<&Mask>,
        intensities: &IntensityVector,
    ) {
        if let Some(mask) = mask {
            surface.put_frame(mask.as_frame());
        }

        for (index, region) in grid.regions().iter().enumerate().rev() {
            let Some(seen) = self.max_intensity_seen.get_mut(index) else {
                continue;
            };
            let current = intensities.get(index).unwrap_or(0.0);
            if *seen < current {
                *seen = current;
            }

            let (red, green, blue) = REGION_FILL;
            let fill = Rgba::new(red, green, blue, (*seen / 100.0) as f32);
            surface.fill_rect(
                region.origin_x,
                region.origin_y,
                region.width,
                region.height,
                fill,
                BlendMode::SourceOver,
            );
            surface.stroke_rect(
                region.origin_x,
                region.origin_y,
                region.width,
                region.height,
                REGION_STROKE,
            );

            if *seen > AFTERGLOW_FLOOR {
                *seen -= AFTERGLOW_DECAY;
            }
        }
    }
}
