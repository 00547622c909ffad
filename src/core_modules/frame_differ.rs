// THEORY:
// The `FrameDiffer` is the pairwise comparison layer. It takes two same-sized
// frames and decides, pixel by pixel, whether something moved. The comparison
// uses the channel average of each pixel as a luminance approximation, so only
// changes in brightness register; a change in hue at constant brightness does
// not.
//
// The differ is a pure function over buffers: it never mutates its inputs and
// always allocates a fresh `Mask`. A length mismatch between the two buffers
// means the resolution changed under it; that is reported as `None` so the
// caller can treat the frame as "no motion data available".

use crate::core_modules::frame::{Frame, Mask};
use crate::core_modules::pixel::pixel::Pixel;

pub type LuminanceDelta = u16;

/// Integer absolute difference between the channel averages of two pixels.
///
/// `|avg(a) - avg(b)|` truncated towards zero, which is exactly
/// `|sum(a) - sum(b)| / 3` in integer arithmetic.
#[inline]
pub fn luminance_delta(a: &Pixel, b: &Pixel) -> LuminanceDelta {
    a.sum().abs_diff(b.sum()) / 3
}

pub struct FrameDiffer;

impl FrameDiffer {
    /// Thresholds the luminance delta of every pixel pair into a binary mask.
    /// A pixel is changed iff its delta is strictly greater than `threshold`.
    ///
    /// Returns `None` when the two buffers differ in length.
    pub fn diff(current: &Frame, previous: &Frame, threshold: u8) -> Option<Mask> {
        if current.as_bytes().len() != previous.as_bytes().len() {
            return None;
        }

        let threshold = threshold as LuminanceDelta;
        let flags = current
            .pixels()
            .zip(previous.pixels())
            .map(|(a, b)| luminance_delta(&a, &b) > threshold);

        Some(Mask::from_flags(current.width(), current.height(), flags))
    }
}
