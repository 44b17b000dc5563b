//! Source pixel buffers and the color-model contract they are read through.
//!
//! [`PixelBuffer`] is the closed set of buffer shapes the encoder accepts.
//! Typed variants borrow an `imgref::ImgRef` with pixels from the `rgb`
//! crate; [`PlanarImage`] and [`YCbCrImage`] borrow raw bytes. Anything else
//! can be passed as [`PixelBuffer::Other`] through the [`PixelSource`] trait.

mod planar;
mod ycbcr;

use alloc::format;
use core::fmt;

pub use imgref::{ImgRef, ImgVec};
pub use rgb::alt::BGR;
pub use rgb::{Rgb, Rgba};

pub use planar::{PlanarImage, SampleDepth};
pub use ycbcr::{ChromaSubsampling, YCbCrImage, ycbcr_to_rgb};

use crate::CodecError;

/// Axis-aligned rectangle; `min` is inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    /// Rectangle from two corners, swapped if given in the wrong order.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Rect {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Rectangle at the origin.
    ///
    /// # Panics
    ///
    /// If `width` or `height` exceeds `i32::MAX`.
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::at(0, 0, width, height)
    }

    /// Rectangle with the given top-left corner and size.
    ///
    /// # Panics
    ///
    /// If the far corner does not fit in `i32`. See [`Rect::checked_at`].
    pub fn at(x: i32, y: i32, width: usize, height: usize) -> Self {
        match Self::checked_at(x, y, width, height) {
            Some(rect) => rect,
            None => panic!("rectangle at ({x}, {y}) of {width}x{height} overflows i32"),
        }
    }

    /// Rectangle with the given top-left corner and size, or `None` if the
    /// far corner does not fit in `i32`.
    pub fn checked_at(x: i32, y: i32, width: usize, height: usize) -> Option<Self> {
        let max_x = x.checked_add(i32::try_from(width).ok()?)?;
        let max_y = y.checked_add(i32::try_from(height).ok()?)?;
        Some(Rect {
            min_x: x,
            min_y: y,
            max_x,
            max_y,
        })
    }

    pub fn width(&self) -> usize {
        span(self.min_x, self.max_x)
    }

    pub fn height(&self) -> usize {
        span(self.min_y, self.max_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// [`Rect::checked_at`] at the origin, as a construction error.
    pub(crate) fn sized(width: usize, height: usize) -> Result<Self, CodecError> {
        Self::checked_at(0, 0, width, height).ok_or_else(|| {
            CodecError::InvalidInput(format!("{width}x{height} exceeds the coordinate space"))
        })
    }
}

/// Distance from `min` to `max`, zero when inverted.
#[inline]
pub(crate) fn span(min: i32, max: i32) -> usize {
    if max > min { max.abs_diff(min) as usize } else { 0 }
}

/// Color-model capability of a pixel buffer.
///
/// Implementors report their geometry and sample format, and convert any
/// in-bounds pixel to straight (non-premultiplied) RGBA with 16 bits per
/// channel. The 8-bit conversions are derived from that.
pub trait PixelSource {
    fn bounds(&self) -> Rect;

    /// Channels per pixel, alpha included.
    fn channels(&self) -> u8;

    /// Bits per sample.
    fn sample_bits(&self) -> u8;

    /// Straight-alpha RGBA at `(x, y)`, which must lie inside [`bounds`](Self::bounds).
    fn rgba64_at(&self, x: i32, y: i32) -> Rgba<u16>;

    /// 8-bit luma, with the ITU-R BT.601 weights.
    fn gray_at(&self, x: i32, y: i32) -> u8 {
        luma(self.rgba64_at(x, y))
    }

    /// 8-bit RGB; alpha is dropped.
    fn rgb_at(&self, x: i32, y: i32) -> Rgb<u8> {
        let c = self.rgba64_at(x, y);
        Rgb {
            r: narrow(c.r),
            g: narrow(c.g),
            b: narrow(c.b),
        }
    }

    fn rgba_at(&self, x: i32, y: i32) -> Rgba<u8> {
        let c = self.rgba64_at(x, y);
        Rgba {
            r: narrow(c.r),
            g: narrow(c.g),
            b: narrow(c.b),
            a: narrow(c.a),
        }
    }
}

/// A pixel type with a fixed color model.
pub trait Pixel: Copy {
    const CHANNELS: u8;
    const BITS: u8;

    fn to_rgba64(self) -> Rgba<u16>;
}

impl Pixel for u8 {
    const CHANNELS: u8 = 1;
    const BITS: u8 = 8;

    fn to_rgba64(self) -> Rgba<u16> {
        let v = widen(self);
        Rgba::new(v, v, v, 0xffff)
    }
}

impl Pixel for u16 {
    const CHANNELS: u8 = 1;
    const BITS: u8 = 16;

    fn to_rgba64(self) -> Rgba<u16> {
        Rgba::new(self, self, self, 0xffff)
    }
}

impl Pixel for Rgb<u8> {
    const CHANNELS: u8 = 3;
    const BITS: u8 = 8;

    fn to_rgba64(self) -> Rgba<u16> {
        Rgba::new(widen(self.r), widen(self.g), widen(self.b), 0xffff)
    }
}

impl Pixel for BGR<u8> {
    const CHANNELS: u8 = 3;
    const BITS: u8 = 8;

    fn to_rgba64(self) -> Rgba<u16> {
        Rgba::new(widen(self.r), widen(self.g), widen(self.b), 0xffff)
    }
}

impl Pixel for Rgb<u16> {
    const CHANNELS: u8 = 3;
    const BITS: u8 = 16;

    fn to_rgba64(self) -> Rgba<u16> {
        Rgba::new(self.r, self.g, self.b, 0xffff)
    }
}

impl Pixel for Rgba<u8> {
    const CHANNELS: u8 = 4;
    const BITS: u8 = 8;

    fn to_rgba64(self) -> Rgba<u16> {
        Rgba::new(widen(self.r), widen(self.g), widen(self.b), widen(self.a))
    }
}

impl Pixel for Rgba<u16> {
    const CHANNELS: u8 = 4;
    const BITS: u8 = 16;

    fn to_rgba64(self) -> Rgba<u16> {
        self
    }
}

/// A typed, strided image placed at an origin.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a, P> {
    img: ImgRef<'a, P>,
    min_x: i32,
    min_y: i32,
}

impl<'a, P: Copy> Frame<'a, P> {
    /// Frame with its top-left pixel at `(0, 0)`.
    ///
    /// # Panics
    ///
    /// If the image is wider or taller than `i32::MAX`.
    pub fn new(img: ImgRef<'a, P>) -> Self {
        assert!(
            Rect::checked_at(0, 0, img.width(), img.height()).is_some(),
            "{}x{} frame is too large",
            img.width(),
            img.height()
        );
        Frame {
            img,
            min_x: 0,
            min_y: 0,
        }
    }

    /// Frame with its top-left pixel at `(x, y)`.
    ///
    /// Fails if the bottom-right corner does not fit in `i32`.
    pub fn with_origin(img: ImgRef<'a, P>, x: i32, y: i32) -> Result<Self, CodecError> {
        if Rect::checked_at(x, y, img.width(), img.height()).is_none() {
            return Err(CodecError::InvalidInput(format!(
                "{}x{} frame at ({x}, {y}) overflows the coordinate space",
                img.width(),
                img.height()
            )));
        }
        Ok(Frame {
            img,
            min_x: x,
            min_y: y,
        })
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.min_x, self.min_y, self.img.width(), self.img.height())
    }

    /// The underlying view, stride included.
    pub fn img(&self) -> ImgRef<'a, P> {
        self.img
    }

    fn pixel(&self, x: i32, y: i32) -> P {
        let col = span(self.min_x, x);
        let row = span(self.min_y, y);
        self.img.buf()[row * self.img.stride() + col]
    }
}

impl<P: Pixel> PixelSource for Frame<'_, P> {
    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn channels(&self) -> u8 {
        P::CHANNELS
    }

    fn sample_bits(&self) -> u8 {
        P::BITS
    }

    fn rgba64_at(&self, x: i32, y: i32) -> Rgba<u16> {
        self.pixel(x, y).to_rgba64()
    }
}

/// A frame whose color channels are premultiplied by alpha.
#[derive(Clone, Copy, Debug)]
pub struct Premultiplied<'a, P>(pub Frame<'a, P>);

impl<P: Pixel> PixelSource for Premultiplied<'_, P> {
    fn bounds(&self) -> Rect {
        self.0.rect()
    }

    fn channels(&self) -> u8 {
        P::CHANNELS
    }

    fn sample_bits(&self) -> u8 {
        P::BITS
    }

    fn rgba64_at(&self, x: i32, y: i32) -> Rgba<u16> {
        unpremultiply(self.0.pixel(x, y).to_rgba64())
    }
}

/// Every pixel-buffer shape the normalizer knows how to handle.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum PixelBuffer<'a> {
    Gray8(Frame<'a, u8>),
    Gray16(Frame<'a, u16>),
    Rgb8(Frame<'a, Rgb<u8>>),
    /// 8-bit RGB stored blue first.
    Bgr8(Frame<'a, BGR<u8>>),
    Rgb16(Frame<'a, Rgb<u16>>),
    /// 8-bit straight-alpha RGBA.
    Rgba8(Frame<'a, Rgba<u8>>),
    /// 16-bit straight-alpha RGBA.
    Rgba16(Frame<'a, Rgba<u16>>),
    PremultipliedRgba8(Premultiplied<'a, Rgba<u8>>),
    PremultipliedRgba16(Premultiplied<'a, Rgba<u16>>),
    /// Chroma-subsampled Y'CbCr planes.
    YCbCr(YCbCrImage<'a>),
    /// Raw interleaved samples.
    Planar(PlanarImage<'a>),
    /// Any other source, converted through its [`PixelSource`] contract.
    Other(&'a dyn PixelSource),
}

impl<'a> PixelBuffer<'a> {
    /// The buffer as a color-model source.
    pub fn as_source(&self) -> &dyn PixelSource {
        match self {
            PixelBuffer::Gray8(f) => f,
            PixelBuffer::Gray16(f) => f,
            PixelBuffer::Rgb8(f) => f,
            PixelBuffer::Bgr8(f) => f,
            PixelBuffer::Rgb16(f) => f,
            PixelBuffer::Rgba8(f) => f,
            PixelBuffer::Rgba16(f) => f,
            PixelBuffer::PremultipliedRgba8(p) => p,
            PixelBuffer::PremultipliedRgba16(p) => p,
            PixelBuffer::YCbCr(m) => m,
            PixelBuffer::Planar(p) => p,
            PixelBuffer::Other(src) => *src,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_source().bounds()
    }

    /// Variant name, for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PixelBuffer::Gray8(_) => "Gray8",
            PixelBuffer::Gray16(_) => "Gray16",
            PixelBuffer::Rgb8(_) => "Rgb8",
            PixelBuffer::Bgr8(_) => "Bgr8",
            PixelBuffer::Rgb16(_) => "Rgb16",
            PixelBuffer::Rgba8(_) => "Rgba8",
            PixelBuffer::Rgba16(_) => "Rgba16",
            PixelBuffer::PremultipliedRgba8(_) => "PremultipliedRgba8",
            PixelBuffer::PremultipliedRgba16(_) => "PremultipliedRgba16",
            PixelBuffer::YCbCr(_) => "YCbCr",
            PixelBuffer::Planar(_) => "Planar",
            PixelBuffer::Other(_) => "Other",
        }
    }
}

impl fmt::Debug for PixelBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = self.as_source();
        f.debug_struct("PixelBuffer")
            .field("kind", &self.kind())
            .field("bounds", &src.bounds())
            .field("channels", &src.channels())
            .field("sample_bits", &src.sample_bits())
            .finish()
    }
}

impl<'a> From<ImgRef<'a, u8>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, u8>) -> Self {
        PixelBuffer::Gray8(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, u16>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, u16>) -> Self {
        PixelBuffer::Gray16(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, Rgb<u8>>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, Rgb<u8>>) -> Self {
        PixelBuffer::Rgb8(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, BGR<u8>>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, BGR<u8>>) -> Self {
        PixelBuffer::Bgr8(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, Rgb<u16>>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, Rgb<u16>>) -> Self {
        PixelBuffer::Rgb16(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, Rgba<u8>>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, Rgba<u8>>) -> Self {
        PixelBuffer::Rgba8(Frame::new(img))
    }
}

impl<'a> From<ImgRef<'a, Rgba<u16>>> for PixelBuffer<'a> {
    fn from(img: ImgRef<'a, Rgba<u16>>) -> Self {
        PixelBuffer::Rgba16(Frame::new(img))
    }
}

impl<'a> From<PlanarImage<'a>> for PixelBuffer<'a> {
    fn from(img: PlanarImage<'a>) -> Self {
        PixelBuffer::Planar(img)
    }
}

impl<'a> From<YCbCrImage<'a>> for PixelBuffer<'a> {
    fn from(img: YCbCrImage<'a>) -> Self {
        PixelBuffer::YCbCr(img)
    }
}

/// 8-bit sample to 16-bit, `0xff` mapping to `0xffff`.
#[inline]
pub(crate) fn widen(v: u8) -> u16 {
    u16::from(v) * 0x101
}

/// 16-bit sample to 8-bit, keeping the high byte.
#[inline]
pub(crate) fn narrow(v: u16) -> u8 {
    (v >> 8) as u8
}

#[inline]
pub(crate) fn luma(c: Rgba<u16>) -> u8 {
    let y = 19595 * u32::from(c.r) + 38470 * u32::from(c.g) + 7471 * u32::from(c.b) + (1 << 15);
    (y >> 24) as u8
}

pub(crate) fn unpremultiply(c: Rgba<u16>) -> Rgba<u16> {
    if c.a == 0xffff {
        return c;
    }
    if c.a == 0 {
        return Rgba::new(0, 0, 0, 0);
    }
    let a = u32::from(c.a);
    let un = |v: u16| ((u32::from(v) * 0xffff / a).min(0xffff)) as u16;
    Rgba::new(un(c.r), un(c.g), un(c.b), c.a)
}
