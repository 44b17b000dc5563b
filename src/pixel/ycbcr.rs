use alloc::format;

use rgb::{Rgb, Rgba};

use super::{PixelSource, Rect, span, widen};
use crate::CodecError;

/// Chroma plane resolution relative to luma, as `J:a:b` ratios.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChromaSubsampling {
    /// Full resolution chroma.
    #[default]
    S444,
    /// Half width.
    S422,
    /// Half width, half height.
    S420,
    /// Half height.
    S440,
    /// Quarter width.
    S411,
    /// Quarter width, half height.
    S410,
}

impl ChromaSubsampling {
    /// Horizontal and vertical luma samples per chroma sample.
    fn factors(self) -> (i32, i32) {
        match self {
            ChromaSubsampling::S444 => (1, 1),
            ChromaSubsampling::S422 => (2, 1),
            ChromaSubsampling::S420 => (2, 2),
            ChromaSubsampling::S440 => (1, 2),
            ChromaSubsampling::S411 => (4, 1),
            ChromaSubsampling::S410 => (4, 2),
        }
    }

    /// Size of a chroma plane covering `rect`.
    fn chroma_size(self, rect: Rect) -> (usize, usize) {
        if rect.is_empty() {
            return (0, 0);
        }
        let (fx, fy) = self.factors();
        let w = span(rect.min_x.div_euclid(fx), (rect.max_x - 1).div_euclid(fx)) + 1;
        let h = span(rect.min_y.div_euclid(fy), (rect.max_y - 1).div_euclid(fy)) + 1;
        (w, h)
    }
}

/// Full-range (JFIF) Y'CbCr to 8-bit RGB.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgb<u8> {
    let yy = i32::from(y) * 0x10101;
    let cb = i32::from(cb) - 128;
    let cr = i32::from(cr) - 128;
    let clamp = |v: i32| (v.clamp(0, 0xff_ffff) >> 16) as u8;
    Rgb {
        r: clamp(yy + 91881 * cr),
        g: clamp(yy - 22554 * cb - 46802 * cr),
        b: clamp(yy + 116130 * cb),
    }
}

/// Borrowed 8-bit Y'CbCr planes, chroma possibly subsampled.
#[derive(Clone, Copy, Debug)]
pub struct YCbCrImage<'a> {
    y: &'a [u8],
    cb: &'a [u8],
    cr: &'a [u8],
    y_stride: usize,
    c_stride: usize,
    subsampling: ChromaSubsampling,
    rect: Rect,
}

impl<'a> YCbCrImage<'a> {
    /// Wrap three planes. Chroma rows start at `c_stride` intervals in both
    /// `cb` and `cr`.
    pub fn new(
        y: &'a [u8],
        cb: &'a [u8],
        cr: &'a [u8],
        y_stride: usize,
        c_stride: usize,
        subsampling: ChromaSubsampling,
        rect: Rect,
    ) -> Result<Self, CodecError> {
        check_plane("luma", y.len(), y_stride, rect.width(), rect.height())?;
        let (cw, ch) = subsampling.chroma_size(rect);
        check_plane("cb", cb.len(), c_stride, cw, ch)?;
        check_plane("cr", cr.len(), c_stride, cw, ch)?;
        Ok(YCbCrImage {
            y,
            cb,
            cr,
            y_stride,
            c_stride,
            subsampling,
            rect,
        })
    }

    /// Tightly packed planes at the origin.
    pub fn packed(
        y: &'a [u8],
        cb: &'a [u8],
        cr: &'a [u8],
        width: usize,
        height: usize,
        subsampling: ChromaSubsampling,
    ) -> Result<Self, CodecError> {
        let rect = Rect::sized(width, height)?;
        let (cw, _) = subsampling.chroma_size(rect);
        Self::new(y, cb, cr, width, cw, subsampling, rect)
    }

    pub fn subsampling(&self) -> ChromaSubsampling {
        self.subsampling
    }

    fn y_offset(&self, x: i32, y: i32) -> usize {
        span(self.rect.min_y, y) * self.y_stride + span(self.rect.min_x, x)
    }

    fn c_offset(&self, x: i32, y: i32) -> usize {
        let (fx, fy) = self.subsampling.factors();
        let r = self.rect;
        let col = span(r.min_x.div_euclid(fx), x.div_euclid(fx));
        let row = span(r.min_y.div_euclid(fy), y.div_euclid(fy));
        row * self.c_stride + col
    }

    /// RGB at `(x, y)`, straight from the planes.
    pub fn rgb8_at(&self, x: i32, y: i32) -> Rgb<u8> {
        let c = self.c_offset(x, y);
        ycbcr_to_rgb(self.y[self.y_offset(x, y)], self.cb[c], self.cr[c])
    }
}

fn check_plane(
    name: &str,
    len: usize,
    stride: usize,
    width: usize,
    height: usize,
) -> Result<(), CodecError> {
    if stride < width {
        return Err(CodecError::InvalidInput(format!(
            "{name} stride {stride} is shorter than its width {width}"
        )));
    }
    if height > 0 && width > 0 {
        let needed = (height - 1) * stride + width;
        if len < needed {
            return Err(CodecError::InvalidInput(format!(
                "{name} plane holds {len} bytes, {needed} needed"
            )));
        }
    }
    Ok(())
}

impl PixelSource for YCbCrImage<'_> {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn channels(&self) -> u8 {
        3
    }

    fn sample_bits(&self) -> u8 {
        8
    }

    fn rgba64_at(&self, x: i32, y: i32) -> Rgba<u16> {
        let c = self.rgb8_at(x, y);
        Rgba::new(widen(c.r), widen(c.g), widen(c.b), 0xffff)
    }

    fn rgb_at(&self, x: i32, y: i32) -> Rgb<u8> {
        self.rgb8_at(x, y)
    }
}
