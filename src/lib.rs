//! # webpwrite
//!
//! WebP encoding for in-memory pixel buffers, on top of libwebp.
//!
//! Two pieces do the work before libwebp sees any pixels:
//!
//! - the options resolver ([`config`]) turns a sparse [`Options`] into a fully
//!   populated [`ResolvedOptions`] and an [`EncodePath`];
//! - the normalizer ([`pipeline::normalize`]) turns any [`PixelBuffer`] into
//!   8-bit gray, RGB, or RGBA, borrowing the caller's memory when the layout
//!   already fits.
//!
//! The libwebp backend is behind the `webp` feature (on by default). Without
//! it, bring your own [`EncodeBackend`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use webpwrite::Options;
//! use webpwrite::pixel::{ImgVec, PixelBuffer, Rgb};
//!
//! let pixels = ImgVec::new(vec![Rgb::new(200u8, 100, 50); 64 * 64], 64, 64);
//! let image = PixelBuffer::from(pixels.as_ref());
//!
//! // Lossy at the default quality.
//! webpwrite::save("out.webp", &image, None)?;
//!
//! // Lossless, into memory.
//! let bytes = webpwrite::encode_to_vec(&image, Some(&Options::lossless()))?;
//! let decoded = webpwrite::decode(&bytes)?;
//! assert_eq!((decoded.width, decoded.height), (64, 64));
//! # Ok::<(), webpwrite::CodecError>(())
//! ```

#![forbid(unsafe_code)]

extern crate alloc;

pub mod codecs;
pub mod config;
mod decode;
mod encode;
mod error;
pub mod pipeline;
pub mod pixel;

pub use codecs::EncodeBackend;
#[cfg(feature = "webp")]
pub use codecs::LibWebp;
pub use config::{
    AlphaFiltering, DEFAULT_QUALITY, EncodePath, FilterType, ImageHint, Options, ResolvedOptions,
};
#[cfg(feature = "webp")]
pub use decode::decode;
pub use decode::{DecodeOutput, DecodedPixels};
pub use encode::{EncodeOutput, EncodeRequest};
pub use error::CodecError;
pub use pipeline::EntryPoint;
pub use pixel::PixelBuffer;

/// Encode `image` and write the bitstream to `sink`.
///
/// `None` options encode lossy at quality 90.
#[cfg(feature = "webp")]
pub fn encode<W: std::io::Write>(
    sink: W,
    image: &PixelBuffer<'_>,
    options: Option<&Options>,
) -> Result<(), CodecError> {
    EncodeRequest::new().options(options).encode(sink, image)?;
    Ok(())
}

/// Encode `image` into a new file at `path`.
#[cfg(feature = "webp")]
pub fn save(
    path: impl AsRef<std::path::Path>,
    image: &PixelBuffer<'_>,
    options: Option<&Options>,
) -> Result<(), CodecError> {
    EncodeRequest::new().options(options).save(path, image)?;
    Ok(())
}

#[cfg(feature = "webp")]
pub fn encode_to_vec(
    image: &PixelBuffer<'_>,
    options: Option<&Options>,
) -> Result<alloc::vec::Vec<u8>, CodecError> {
    Ok(EncodeRequest::new().options(options).encode_to_vec(image)?.data)
}
