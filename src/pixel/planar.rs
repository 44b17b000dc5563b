use alloc::format;

use rgb::Rgba;

use super::{PixelSource, Rect, span, widen};
use crate::CodecError;

/// Width of one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleDepth {
    U8,
    /// 16-bit samples, little-endian.
    U16,
}

impl SampleDepth {
    pub fn bits(self) -> u8 {
        match self {
            SampleDepth::U8 => 8,
            SampleDepth::U16 => 16,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            SampleDepth::U8 => 1,
            SampleDepth::U16 => 2,
        }
    }
}

/// Interleaved samples in a borrowed byte buffer.
///
/// Channel counts map to a color model: 1 is gray, 2 gray with alpha,
/// 3 RGB, 4 straight-alpha RGBA.
#[derive(Clone, Copy, Debug)]
pub struct PlanarImage<'a> {
    data: &'a [u8],
    rect: Rect,
    stride: usize,
    channels: u8,
    depth: SampleDepth,
}

impl<'a> PlanarImage<'a> {
    /// Wrap `data` with a byte `stride` between rows.
    ///
    /// Fails if `channels` is not in `1..=4`, if a row does not fit in
    /// `stride`, or if `data` is too short for the last row.
    pub fn new(
        data: &'a [u8],
        rect: Rect,
        stride: usize,
        channels: u8,
        depth: SampleDepth,
    ) -> Result<Self, CodecError> {
        if !(1..=4).contains(&channels) {
            return Err(CodecError::InvalidInput(format!(
                "unsupported channel count {channels}"
            )));
        }
        let row_bytes = rect.width() * usize::from(channels) * depth.bytes();
        if stride < row_bytes {
            return Err(CodecError::InvalidInput(format!(
                "stride {stride} is shorter than a row of {row_bytes} bytes"
            )));
        }
        let height = rect.height();
        if height > 0 && row_bytes > 0 {
            let needed = (height - 1) * stride + row_bytes;
            if data.len() < needed {
                return Err(CodecError::InvalidInput(format!(
                    "buffer holds {} bytes, {needed} needed",
                    data.len()
                )));
            }
        }
        Ok(PlanarImage {
            data,
            rect,
            stride,
            channels,
            depth,
        })
    }

    /// Tightly packed rows at the origin.
    pub fn packed(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: u8,
        depth: SampleDepth,
    ) -> Result<Self, CodecError> {
        let stride = width * usize::from(channels) * depth.bytes();
        Self::new(data, Rect::sized(width, height)?, stride, channels, depth)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Reinterpret 8-bit samples as pixels of `P` without copying.
    ///
    /// Only possible when `P` is exactly one pixel wide and the byte stride
    /// is a whole number of pixels.
    pub(crate) fn view<P: bytemuck::Pod>(&self) -> Option<imgref::ImgRef<'a, P>> {
        let channels = usize::from(self.channels);
        if self.depth != SampleDepth::U8
            || core::mem::size_of::<P>() != channels
            || self.stride % channels != 0
            || self.rect.is_empty()
        {
            return None;
        }
        let (width, height) = (self.rect.width(), self.rect.height());
        let stride_px = self.stride / channels;
        let len = ((height - 1) * stride_px + width) * channels;
        let data: &'a [u8] = self.data;
        let pixels: &'a [P] = bytemuck::try_cast_slice(&data[..len]).ok()?;
        Some(imgref::ImgRef::new_stride(pixels, width, height, stride_px))
    }

    fn sample(&self, offset: usize) -> u16 {
        match self.depth {
            SampleDepth::U8 => widen(self.data[offset]),
            SampleDepth::U16 => u16::from_le_bytes([self.data[offset], self.data[offset + 1]]),
        }
    }
}

impl PixelSource for PlanarImage<'_> {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn channels(&self) -> u8 {
        self.channels
    }

    fn sample_bits(&self) -> u8 {
        self.depth.bits()
    }

    fn rgba64_at(&self, x: i32, y: i32) -> Rgba<u16> {
        let col = span(self.rect.min_x, x);
        let row = span(self.rect.min_y, y);
        let step = self.depth.bytes();
        let base = row * self.stride + col * usize::from(self.channels) * step;
        let s = |i: usize| self.sample(base + i * step);
        match self.channels {
            1 => {
                let v = s(0);
                Rgba::new(v, v, v, 0xffff)
            }
            2 => {
                let v = s(0);
                Rgba::new(v, v, v, s(1))
            }
            3 => Rgba::new(s(0), s(1), s(2), 0xffff),
            _ => Rgba::new(s(0), s(1), s(2), s(3)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgb::Rgb;

    #[test]
    fn rejects_bad_channel_count() {
        let data = [0u8; 10];
        for channels in [0, 5] {
            let err = PlanarImage::packed(&data, 1, 1, channels, SampleDepth::U8).unwrap_err();
            assert!(matches!(err, CodecError::InvalidInput(_)));
        }
    }

    #[test]
    fn rejects_short_stride_and_buffer() {
        let data = [0u8; 12];
        let rect = Rect::from_size(2, 2);
        assert!(PlanarImage::new(&data, rect, 5, 3, SampleDepth::U8).is_err());
        assert!(PlanarImage::new(&data, rect, 6, 3, SampleDepth::U8).is_ok());
        // The last row does not need padding, but it must be complete.
        assert!(PlanarImage::new(&data[..11], rect, 6, 3, SampleDepth::U8).is_err());
        assert!(PlanarImage::new(&data[..10], rect, 4, 1, SampleDepth::U16).is_ok());
    }

    #[test]
    fn oversized_packed_image_is_rejected() {
        let err = PlanarImage::packed(&[], 1 << 31, 0, 1, SampleDepth::U8).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)), "{err}");
    }

    #[test]
    fn reads_at_the_far_edge_of_the_coordinate_space() {
        let data = [1u8, 2, 3, 4];
        let rect = Rect::new(i32::MAX - 2, i32::MIN, i32::MAX, i32::MIN + 2);
        let planar = PlanarImage::new(&data, rect, 2, 1, SampleDepth::U8).unwrap();
        assert_eq!(planar.gray_at(i32::MAX - 1, i32::MIN + 1), 4);
    }

    #[test]
    fn view_borrows_matching_layout() {
        // 2x2 RGB with one byte of padding per row.
        let data = [1u8, 2, 3, 4, 5, 6, 0, 7, 8, 9, 10, 11, 12];
        let planar = PlanarImage::new(&data, Rect::from_size(2, 2), 7, 3, SampleDepth::U8).unwrap();
        // Stride 7 is not a whole number of RGB pixels.
        assert!(planar.view::<Rgb<u8>>().is_none());

        let data = [1u8, 2, 3, 4, 5, 6, 0, 0, 0, 7, 8, 9, 10, 11, 12];
        let planar = PlanarImage::new(&data, Rect::from_size(2, 2), 9, 3, SampleDepth::U8).unwrap();
        let view = planar.view::<Rgb<u8>>().unwrap();
        assert_eq!(view.stride(), 3);
        assert_eq!(view.buf().as_ptr().cast::<u8>(), data.as_ptr());
        assert_eq!(view.pixels().last(), Some(Rgb::new(10, 11, 12)));
        // Wrong pixel type for the channel count.
        assert!(planar.view::<Rgba<u8>>().is_none());
    }

    #[test]
    fn sixteen_bit_samples_are_little_endian() {
        let data = [0x34u8, 0x12, 0xff, 0xff];
        let planar = PlanarImage::packed(&data, 1, 1, 2, SampleDepth::U16).unwrap();
        let c = planar.rgba64_at(0, 0);
        assert_eq!(c, Rgba::new(0x1234, 0x1234, 0x1234, 0xffff));
        assert_eq!(planar.gray_at(0, 0), 0x12);
        assert!(planar.view::<u8>().is_none());
    }

    #[test]
    fn gray_alpha_reads_alpha() {
        let data = [200u8, 50];
        let planar = PlanarImage::packed(&data, 1, 1, 2, SampleDepth::U8).unwrap();
        assert_eq!(planar.rgba_at(0, 0), Rgba::new(200, 200, 200, 50));
    }
}
