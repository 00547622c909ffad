// THEORY:
// The `Pixel` module is the most fundamental unit of the motion core. It is a
// "dumb" data container for a single RGBA pixel plus the one heuristic the
// differ needs: the channel average `(R+G+B)/3`, a cheap luminance stand-in
// that ignores hue and chrominance entirely. Anything comparing two pixels
// lives in `frame_differ`.

pub mod pixel {
    use crate::error::EngineError;

    pub type Byte = u8;
    pub type Channel = Byte;
    /// Sum of the R, G and B channels (0..=765).
    pub type Sum = u16;

    /// Interleaved channels per pixel (R, G, B, A).
    pub const CHANNELS: usize = 4;

    /// A single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const BLACK: Pixel = Pixel::new(0, 0, 0, 255);
        pub const WHITE: Pixel = Pixel::new(255, 255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// An opaque gray pixel.
        pub const fn gray(value: Channel) -> Self {
            Pixel::new(value, value, value, 255)
        }

        /// Sum of the color channels. Alpha never takes part in motion.
        #[inline]
        pub fn sum(&self) -> Sum {
            self.red as Sum + self.green as Sum + self.blue as Sum
        }

        pub fn to_bytes(self) -> [Byte; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = EngineError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match bytes {
                [red, green, blue, alpha] => Ok(Pixel::new(*red, *green, *blue, *alpha)),
                _ => Err(EngineError::InvalidFrame {
                    expected: CHANNELS,
                    actual: bytes.len(),
                }),
            }
        }
    }
}
