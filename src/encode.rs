//! Image encoding.

use alloc::vec::Vec;
use std::io::Write;
use std::path::Path;

use crate::codecs::EncodeBackend;
use crate::config::{EncodePath, Options, resolve};
use crate::pipeline::{self, EntryPoint};
use crate::pixel::PixelBuffer;
use crate::CodecError;

/// Encoded image output.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct EncodeOutput {
    /// The WebP bitstream.
    pub data: Vec<u8>,
    /// Path class the options resolved to.
    pub path: EncodePath,
    /// Encoder entry point that produced `data`.
    pub entry: EntryPoint,
}

/// Image encode request builder.
///
/// # Example
///
/// ```no_run
/// use webpwrite::{EncodeRequest, Options};
/// use webpwrite::pixel::{ImgVec, PixelBuffer, Rgba};
///
/// let pixels = ImgVec::new(vec![Rgba { r: 0u8, g: 0, b: 0, a: 255 }; 100 * 100], 100, 100);
/// let options = Options::new().with_quality(85.0);
/// let output = EncodeRequest::new()
///     .with_options(&options)
///     .encode_to_vec(&PixelBuffer::from(pixels.as_ref()))?;
/// # Ok::<(), webpwrite::CodecError>(())
/// ```
#[derive(Clone, Copy)]
pub struct EncodeRequest<'a> {
    options: Option<&'a Options>,
    backend: &'a dyn EncodeBackend,
}

#[cfg(feature = "webp")]
impl Default for EncodeRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> EncodeRequest<'a> {
    /// Encode through libwebp with default options.
    #[cfg(feature = "webp")]
    pub fn new() -> Self {
        Self::with_backend(&crate::codecs::LibWebp)
    }

    /// Encode through `backend` with default options.
    pub fn with_backend(backend: &'a dyn EncodeBackend) -> Self {
        Self {
            options: None,
            backend,
        }
    }

    /// Set encoder options.
    pub fn with_options(mut self, options: &'a Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set or clear encoder options; `None` encodes lossy at the default quality.
    pub fn options(mut self, options: Option<&'a Options>) -> Self {
        self.options = options;
        self
    }

    /// Encode into memory.
    pub fn encode_to_vec(&self, image: &PixelBuffer<'_>) -> Result<EncodeOutput, CodecError> {
        let (resolved, path) = resolve(self.options);
        let canonical = pipeline::normalize(image);
        let entry = pipeline::plan(path, canonical.layout(), &resolved);
        let rect = canonical.rect();
        tracing::debug!(
            ?path,
            %entry,
            width = rect.width(),
            height = rect.height(),
            borrowed = canonical.is_borrowed(),
            "encoding"
        );
        let data = pipeline::run(self.backend, entry, &canonical, &resolved)?;
        Ok(EncodeOutput { data, path, entry })
    }

    /// Encode and write the bitstream to `sink` in one write.
    ///
    /// Nothing is written if encoding fails.
    pub fn encode<W: Write>(
        &self,
        mut sink: W,
        image: &PixelBuffer<'_>,
    ) -> Result<EncodeOutput, CodecError> {
        let output = self.encode_to_vec(image)?;
        sink.write_all(&output.data)?;
        Ok(output)
    }

    /// Encode and write the bitstream to a new file at `path`.
    ///
    /// The file is only created once encoding succeeded.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        image: &PixelBuffer<'_>,
    ) -> Result<EncodeOutput, CodecError> {
        let output = self.encode_to_vec(image)?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(&output.data)?;
        Ok(output)
    }
}
