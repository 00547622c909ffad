// THEORY:
// The `RegionGrid` partitions the analyzer's working raster into a fixed grid of
// equal rectangular regions. It is the spatial half of the motion core: the
// differ says *which* pixels changed, the grid says *where* they belong.
//
// Key architectural principles:
// 1.  **Immutable Geometry**: The grid is derived once from the working size and
//     the region counts, and never changes afterwards. Every region shares the
//     same width and height (`floor(w / columns)` by `floor(h / rows)`).
// 2.  **Remainder Exclusion**: When the working size is not an exact multiple of
//     the region counts, the right and bottom remainder strips belong to no
//     region and are never counted.
// 3.  **Flat Lookup**: `region_index_of` maps a flat pixel index straight to a
//     region index, so aggregation is a single pass over the mask.
// 4.  **Rendering Geometry**: The region rectangles are exposed in row-major
//     order for the debug overlay.

use crate::error::{EngineError, EngineResult};

/// One rectangular cell of the grid, in working-resolution pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub origin_x: u32,
    pub origin_y: u32,
    pub width: u32,
    pub height: u32,
}

/// Fixed partition of a `width` x `height` raster into `columns` x `rows` regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGrid {
    /// The width of the full raster in pixels, needed for index math.
    image_width: u32,
    /// The height of the full raster in pixels.
    image_height: u32,
    /// Regions per row.
    columns: u32,
    /// Regions per column.
    rows: u32,
    /// The width of a single region in pixels.
    region_width: u32,
    /// The height of a single region in pixels.
    region_height: u32,
    /// Region rectangles, row-major.
    regions: Vec<Region>,
}

impl RegionGrid {
    /// Builds the grid. Fails when a region would be empty, i.e. when either
    /// count is zero or exceeds the matching dimension.
    pub fn new(image_width: u32, image_height: u32, columns: u32, rows: u32) -> EngineResult<Self> {
        if columns == 0 || rows == 0 || columns > image_width || rows > image_height {
            return Err(EngineError::InvalidGrid {
                width: image_width,
                height: image_height,
                columns,
                rows,
            });
        }

        let region_width = image_width / columns;
        let region_height = image_height / rows;

        let mut regions = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                regions.push(Region {
                    origin_x: column * region_width,
                    origin_y: row * region_height,
                    width: region_width,
                    height: region_height,
                });
            }
        }

        Ok(Self {
            image_width,
            image_height,
            columns,
            rows,
            region_width,
            region_height,
            regions,
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn region_width(&self) -> u32 {
        self.region_width
    }

    pub fn region_height(&self) -> u32 {
        self.region_height
    }

    /// Area of one region. Valid for every region since they all share one size.
    pub fn pixels_per_region(&self) -> u32 {
        self.region_width * self.region_height
    }

    /// Total number of pixels that belong to some region.
    pub fn covered_pixels(&self) -> u64 {
        self.len() as u64 * self.pixels_per_region() as u64
    }

    /// Maps a flat, row-major pixel index to the index of its region.
    ///
    /// The column is taken as `(index mod w, or w when that is 0) - 1`, so the
    /// first pixel of each row is attributed to the last column of that same
    /// row and every other pixel is shifted one column to the left. The row is
    /// `floor(index / w)`. Pixels whose column or row falls into a remainder
    /// strip map to `None`.
    pub fn region_index_of(&self, pixel_index: usize) -> Option<usize> {
        let width = self.image_width as usize;
        let remainder = pixel_index % width;
        let column_in_row = if remainder == 0 { width } else { remainder } - 1;

        let column = column_in_row / self.region_width as usize;
        let row = (pixel_index / width) / self.region_height as usize;

        if column >= self.columns as usize || row >= self.rows as usize {
            return None;
        }
        Some(column + row * self.columns as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_fill_row_major() {
        let grid = RegionGrid::new(300, 300, 3, 3).expect("valid grid");
        assert_eq!(grid.len(), 9);
        assert!(grid.regions().iter().all(|r| r.width == 100 && r.height == 100));
        assert_eq!(grid.regions()[1], Region { origin_x: 100, origin_y: 0, width: 100, height: 100 });
        assert_eq!(grid.regions()[3], Region { origin_x: 0, origin_y: 100, width: 100, height: 100 });
        assert_eq!(grid.regions()[8], Region { origin_x: 200, origin_y: 200, width: 100, height: 100 });
    }

    #[test]
    fn coverage_excludes_remainder_strips() {
        let grid = RegionGrid::new(320, 240, 3, 3).expect("valid grid");
        assert_eq!(grid.region_width(), 106);
        assert_eq!(grid.region_height(), 80);
        assert_eq!(grid.covered_pixels(), (106 * 3) * (80 * 3));

        let grid = RegionGrid::new(300, 300, 3, 3).expect("valid grid");
        assert_eq!(grid.covered_pixels(), 300 * 300);
    }

    #[test]
    fn zero_or_oversized_counts_are_rejected() {
        assert!(RegionGrid::new(300, 300, 0, 3).is_err());
        assert!(RegionGrid::new(300, 300, 3, 0).is_err());
        assert!(RegionGrid::new(2, 300, 3, 3).is_err());
    }

    #[test]
    fn first_pixel_of_a_row_maps_to_the_last_column() {
        let grid = RegionGrid::new(300, 300, 3, 3).expect("valid grid");
        // Index 0: column position w-1, row 0.
        assert_eq!(grid.region_index_of(0), Some(2));
        // First pixel of row 1 and of row 100.
        assert_eq!(grid.region_index_of(300), Some(2));
        assert_eq!(grid.region_index_of(300 * 100), Some(5));
        assert_eq!(grid.region_index_of(300 * 299), Some(8));
    }

    #[test]
    fn column_positions_shift_one_to_the_left() {
        let grid = RegionGrid::new(300, 300, 3, 3).expect("valid grid");
        assert_eq!(grid.region_index_of(1), Some(0));
        assert_eq!(grid.region_index_of(100), Some(0));
        assert_eq!(grid.region_index_of(101), Some(1));
        assert_eq!(grid.region_index_of(200), Some(1));
        assert_eq!(grid.region_index_of(201), Some(2));
        assert_eq!(grid.region_index_of(299), Some(2));
        // Last pixel of the frame.
        assert_eq!(grid.region_index_of(300 * 300 - 1), Some(8));
    }

    #[test]
    fn remainder_pixels_belong_to_no_region() {
        let grid = RegionGrid::new(320, 240, 3, 3).expect("valid grid");
        // Row starts map to column position 319, which lies past 3 * 106.
        assert_eq!(grid.region_index_of(0), None);
        assert_eq!(grid.region_index_of(320), None);
        // Column position 317 is still inside the third column.
        assert_eq!(grid.region_index_of(318), Some(2));
        // Column position 318 is in the remainder strip.
        assert_eq!(grid.region_index_of(319), None);

        let grid = RegionGrid::new(10, 11, 2, 2).expect("valid grid");
        // Row 10 is the bottom remainder row (region height 5).
        assert_eq!(grid.region_index_of(10 * 10 + 3), None);
        assert_eq!(grid.region_index_of(9 * 10 + 3), Some(2));
    }
}
