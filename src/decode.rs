//! WebP decoding, for verifying encoder output.

use imgref::ImgVec;
use rgb::{Rgb, Rgba};

/// Decoded pixels; the layout follows the bitstream's alpha flag.
#[derive(Clone, Debug)]
pub enum DecodedPixels {
    Rgb8(ImgVec<Rgb<u8>>),
    Rgba8(ImgVec<Rgba<u8>>),
}

/// Decoded image output.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pub pixels: DecodedPixels,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl DecodeOutput {
    pub fn has_alpha(&self) -> bool {
        matches!(self.pixels, DecodedPixels::Rgba8(_))
    }

    /// Pixels as RGBA8; images without alpha come back opaque.
    pub fn into_rgba8(self) -> ImgVec<Rgba<u8>> {
        match self.pixels {
            DecodedPixels::Rgba8(img) => img,
            DecodedPixels::Rgb8(img) => {
                let buf = img.pixels().map(|p| Rgba::new(p.r, p.g, p.b, 255)).collect();
                ImgVec::new(buf, img.width(), img.height())
            }
        }
    }
}

/// Decode a still WebP bitstream.
///
/// Fails with [`CodecError::Decode`](crate::CodecError::Decode) when `data`
/// is not a WebP image libwebp can read.
#[cfg(feature = "webp")]
pub fn decode(data: &[u8]) -> Result<DecodeOutput, crate::CodecError> {
    crate::codecs::decode(data)
}
