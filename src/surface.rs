// THEORY:
// The reactions and the debug overlay draw onto a rendering surface owned by the
// UI shell. They only ever need three primitives: fill a rectangle with a color
// under a blend mode, stroke a rectangle outline, and blit a raster. The
// `RenderSurface` trait is that seam.
//
// `ImageSurface` is the in-process implementation over an `image::RgbaImage`,
// used by the tester binary and by the tests. It composites the way a 2D canvas
// does for the two blend modes in use.

use crate::core_modules::frame::Frame;
use image::{Rgba as ImageRgba, RgbaImage};

/// A color with a fractional opacity, like a CSS `rgba()` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// How a fill is combined with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Plain alpha compositing.
    #[default]
    SourceOver,
    /// Keeps the darker of source and destination, per channel.
    Darken,
}

/// The drawing primitives the engine needs from the shell.
pub trait RenderSurface {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba, blend: BlendMode);

    /// Draws a one pixel wide outline of the rectangle.
    fn stroke_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba);

    /// Replaces the pixels under `frame` with its contents, top-left anchored.
    fn put_frame(&mut self, frame: &Frame);
}

/// `RenderSurface` over an owned RGBA image.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, ImageRgba([0, 0, 0, 255])),
        }
    }

    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            image: frame.to_rgba_image(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_frame(self) -> Frame {
        Frame::from_rgba_image(self.image)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, blend: BlendMode) {
        let alpha = color.alpha.clamp(0.0, 1.0);
        let destination = self.image.get_pixel_mut(x, y);
        let source = [color.red, color.green, color.blue];
        for channel in 0..3 {
            let dst = destination.0[channel] as f32;
            let src = match blend {
                BlendMode::SourceOver => source[channel] as f32,
                BlendMode::Darken => (source[channel] as f32).min(dst),
            };
            destination.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
    }

    fn clip(&self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let (surface_width, surface_height) = self.image.dimensions();
        let x_end = x.saturating_add(width).min(surface_width);
        let y_end = y.saturating_add(height).min(surface_height);
        (x.min(x_end), y.min(y_end), x_end, y_end)
    }
}

impl RenderSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba, blend: BlendMode) {
        let (x_start, y_start, x_end, y_end) = self.clip(x, y, width, height);
        for py in y_start..y_end {
            for px in x_start..x_end {
                self.blend_pixel(px, py, color, blend);
            }
        }
    }

    fn stroke_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        if width == 0 || height == 0 {
            return;
        }
        let right = x.saturating_add(width - 1);
        let bottom = y.saturating_add(height - 1);
        self.fill_rect(x, y, width, 1, color, BlendMode::SourceOver);
        self.fill_rect(x, bottom, width, 1, color, BlendMode::SourceOver);
        self.fill_rect(x, y + 1, 1, height.saturating_sub(2), color, BlendMode::SourceOver);
        self.fill_rect(right, y + 1, 1, height.saturating_sub(2), color, BlendMode::SourceOver);
    }

    fn put_frame(&mut self, frame: &Frame) {
        let (surface_width, surface_height) = self.image.dimensions();
        for y in 0..frame.height().min(surface_height) {
            for x in 0..frame.width().min(surface_width) {
                let index = (y * frame.width() + x) as usize;
                if let Some(pixel) = frame.pixel(index) {
                    self.image.put_pixel(x, y, ImageRgba(pixel.to_bytes()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::Pixel;

    #[test]
    fn source_over_mixes_by_alpha() {
        let mut surface = ImageSurface::new(2, 2);
        surface.fill_rect(0, 0, 2, 2, Rgba::new(200, 100, 0, 0.5), BlendMode::SourceOver);
        assert_eq!(surface.pixel(1, 1), [100, 50, 0, 255]);
    }

    #[test]
    fn darken_never_brightens() {
        let mut surface = ImageSurface::from_frame(&Frame::filled(2, 2, Pixel::new(100, 200, 50, 255)));
        surface.fill_rect(0, 0, 2, 2, Rgba::new(255, 0, 0, 1.0), BlendMode::Darken);
        assert_eq!(surface.pixel(0, 0), [100, 0, 0, 255]);
    }

    #[test]
    fn fills_are_clipped_to_the_surface() {
        let mut surface = ImageSurface::new(3, 3);
        surface.fill_rect(2, 2, 10, 10, Rgba::new(255, 255, 255, 1.0), BlendMode::SourceOver);
        assert_eq!(surface.pixel(2, 2), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn stroke_leaves_the_inside_untouched() {
        let mut surface = ImageSurface::new(5, 5);
        surface.stroke_rect(0, 0, 5, 5, Rgba::new(255, 0, 0, 1.0));
        assert_eq!(surface.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(4, 2), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(2, 4), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn put_frame_overwrites_pixels() {
        let mut surface = ImageSurface::new(4, 4);
        surface.put_frame(&Frame::filled(2, 2, Pixel::WHITE));
        assert_eq!(surface.pixel(1, 1), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(2, 2), [0, 0, 0, 255]);
    }
}
