//! Encoder backends.
//!
//! [`EncodeBackend`] is the seam between the pipeline and the native codec:
//! one method per encoder entry point, each taking canonical pixels and
//! returning a complete WebP bitstream.

use alloc::vec::Vec;

use imgref::ImgRef;
use rgb::{Rgb, Rgba};

use crate::CodecError;
use crate::config::ResolvedOptions;

#[cfg(feature = "webp")]
mod webp;

#[cfg(feature = "webp")]
pub use self::webp::LibWebp;
#[cfg(feature = "webp")]
pub(crate) use self::webp::decode;

/// A WebP encoder.
///
/// `quality` is in `0.0..=100.0`. Implementations report codec rejections as
/// [`CodecError::Encode`] naming the entry point that failed.
pub trait EncodeBackend {
    fn encode_gray(&self, img: ImgRef<'_, u8>, quality: f32) -> Result<Vec<u8>, CodecError>;

    fn encode_rgb(&self, img: ImgRef<'_, Rgb<u8>>, quality: f32) -> Result<Vec<u8>, CodecError>;

    fn encode_rgba(&self, img: ImgRef<'_, Rgba<u8>>, quality: f32)
    -> Result<Vec<u8>, CodecError>;

    /// Lossy or lossless RGBA with the full option set.
    fn encode_rgba_with_config(
        &self,
        img: ImgRef<'_, Rgba<u8>>,
        options: &ResolvedOptions,
    ) -> Result<Vec<u8>, CodecError>;

    fn encode_lossless_gray(&self, img: ImgRef<'_, u8>) -> Result<Vec<u8>, CodecError>;

    fn encode_lossless_rgb(&self, img: ImgRef<'_, Rgb<u8>>) -> Result<Vec<u8>, CodecError>;

    /// Lossless RGBA; color under fully transparent pixels may be discarded.
    fn encode_lossless_rgba(&self, img: ImgRef<'_, Rgba<u8>>) -> Result<Vec<u8>, CodecError>;

    /// Lossless RGBA that preserves every channel of every pixel.
    fn encode_exact_lossless_rgba(
        &self,
        img: ImgRef<'_, Rgba<u8>>,
    ) -> Result<Vec<u8>, CodecError>;
}
