// THEORY:
// A `Frame` is an immutable raster: width, height and four interleaved bytes
// (R, G, B, A) per pixel, row-major. Camera frames arrive at whatever resolution
// the capture device delivers, so the frame also owns the one rasterizer
// operation the core depends on: resampling down to the analyzer's working
// resolution. Resampling goes through the `image` crate so the diff math itself
// never has to care about scaling.
//
// A `Mask` is the binary output of the differ. It has the same shape as a frame,
// with every pixel either black (unchanged) or white (changed) and alpha fixed
// at 255, which lets it be drawn directly onto a debug surface.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::{EngineError, EngineResult};
use image::imageops::{self, FilterType};
use image::{ImageEncoder, RgbaImage};
use std::path::Path;

/// Value of a changed pixel in a `Mask`.
pub const CHANGED: u8 = 255;
/// Value of an unchanged pixel in a `Mask`.
pub const UNCHANGED: u8 = 0;

/// An immutable RGBA raster buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps an RGBA buffer, checking that it holds exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EngineResult<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(EngineError::InvalidFrame {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        let bytes = pixel.to_bytes();
        let data = bytes
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Pixel) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).to_bytes());
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length is validated on construction, so `from_raw` cannot fail here.
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels (not bytes).
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// The pixel at a flat, row-major pixel index.
    pub fn pixel(&self, index: usize) -> Option<Pixel> {
        let start = index * CHANNELS;
        let bytes = self.data.get(start..start + CHANNELS)?;
        Pixel::try_from(bytes).ok()
    }

    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|bytes| Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    /// Resamples the frame to `width` x `height`. Returns a plain copy when the
    /// frame already has that size.
    pub fn scaled_to(&self, width: u32, height: u32) -> Frame {
        if self.width == width && self.height == height {
            return self.clone();
        }
        let resized = imageops::resize(&self.to_rgba_image(), width, height, FilterType::Triangle);
        Frame::from_rgba_image(resized)
    }

    /// Mirror image around the vertical axis, the way the installation shows
    /// the camera feed.
    pub fn mirrored(&self) -> Frame {
        Frame::from_rgba_image(imageops::flip_horizontal(&self.to_rgba_image()))
    }

    /// Writes the frame as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Binary change mask produced by the frame differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    frame: Frame,
}

impl Mask {
    /// Builds a mask from one changed/unchanged flag per pixel.
    pub fn from_flags(width: u32, height: u32, flags: impl IntoIterator<Item = bool>) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for changed in flags {
            let value = if changed { CHANGED } else { UNCHANGED };
            data.extend_from_slice(&[value, value, value, 255]);
        }
        Self {
            frame: Frame {
                width,
                height,
                data,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Whether the pixel at a flat pixel index is marked as changed.
    pub fn is_changed(&self, index: usize) -> bool {
        self.frame.data.get(index * CHANNELS) == Some(&CHANGED)
    }

    /// Flat pixel indices of every changed pixel, in row-major order.
    pub fn changed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.frame
            .data
            .chunks_exact(CHANNELS)
            .enumerate()
            .filter(|(_, bytes)| bytes[0] == CHANGED)
            .map(|(index, _)| index)
    }

    pub fn changed_count(&self) -> usize {
        self.changed_indices().count()
    }

    pub fn as_frame(&self) -> &Frame {
        &self.frame
    }
}
