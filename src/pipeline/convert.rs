//! Pixel-buffer normalization.
//!
//! Every [`PixelBuffer`] becomes 8-bit gray, RGB, or RGBA. Buffers already in
//! one of those layouts are borrowed, everything else is converted pixel by
//! pixel through its [`PixelSource`] color model.

use alloc::vec::Vec;

use rgb::{Rgb, Rgba};

use super::canonical::{Canonical, CanonicalImage};
use crate::pixel::{PixelBuffer, PixelSource, PlanarImage};

/// Normalize `image` into one of the three canonical layouts.
///
/// The result covers exactly the input's bounds.
pub fn normalize<'a>(image: &PixelBuffer<'a>) -> Canonical<'a> {
    let rect = image.bounds();
    let canonical = match *image {
        PixelBuffer::Gray8(frame) => Canonical::Gray8(CanonicalImage::borrowed(rect, frame.img())),
        PixelBuffer::Rgb8(frame) => Canonical::Rgb8(CanonicalImage::borrowed(rect, frame.img())),
        PixelBuffer::Rgba8(frame) => Canonical::Rgba8(CanonicalImage::borrowed(rect, frame.img())),
        PixelBuffer::Gray16(ref frame) => Canonical::Gray8(to_gray(frame)),
        PixelBuffer::Bgr8(ref frame) => Canonical::Rgb8(to_rgb(frame)),
        PixelBuffer::Rgb16(ref frame) => Canonical::Rgb8(to_rgb(frame)),
        PixelBuffer::YCbCr(ref img) => Canonical::Rgb8(to_rgb(img)),
        PixelBuffer::Rgba16(ref frame) => Canonical::Rgba8(to_rgba(frame)),
        PixelBuffer::PremultipliedRgba8(ref img) => Canonical::Rgba8(to_rgba(img)),
        PixelBuffer::PremultipliedRgba16(ref img) => Canonical::Rgba8(to_rgba(img)),
        PixelBuffer::Planar(planar) => from_planar(planar),
        PixelBuffer::Other(src) => Canonical::Rgba8(to_rgba(src)),
    };

    assert_eq!(canonical.rect(), rect, "normalized image moved");
    assert_eq!(
        canonical.dimensions(),
        (rect.width(), rect.height()),
        "normalized buffer does not match its rectangle"
    );
    tracing::trace!(
        from = image.kind(),
        to = ?canonical.layout(),
        borrowed = canonical.is_borrowed(),
        "normalized"
    );
    canonical
}

fn from_planar(planar: PlanarImage<'_>) -> Canonical<'_> {
    let rect = planar.rect();
    match planar.channels() {
        1 => Canonical::Gray8(match planar.view::<u8>() {
            Some(img) => CanonicalImage::borrowed(rect, img),
            None => to_gray(&planar),
        }),
        3 => Canonical::Rgb8(match planar.view::<Rgb<u8>>() {
            Some(img) => CanonicalImage::borrowed(rect, img),
            None => to_rgb(&planar),
        }),
        4 => Canonical::Rgba8(match planar.view::<Rgba<u8>>() {
            Some(img) => CanonicalImage::borrowed(rect, img),
            None => to_rgba(&planar),
        }),
        _ => Canonical::Rgba8(to_rgba(&planar)),
    }
}

fn collect<P>(src: &dyn PixelSource, pixel: impl Fn(i32, i32) -> P) -> Vec<P> {
    let rect = src.bounds();
    let mut buf = Vec::with_capacity(rect.width() * rect.height());
    for y in rect.min_y..rect.max_y {
        for x in rect.min_x..rect.max_x {
            buf.push(pixel(x, y));
        }
    }
    tracing::trace!(
        width = rect.width(),
        height = rect.height(),
        channels = src.channels(),
        bits = src.sample_bits(),
        "converting pixels"
    );
    buf
}

fn to_gray(src: &dyn PixelSource) -> CanonicalImage<'static, u8> {
    CanonicalImage::owned(src.bounds(), collect(src, |x, y| src.gray_at(x, y)))
}

fn to_rgb(src: &dyn PixelSource) -> CanonicalImage<'static, Rgb<u8>> {
    CanonicalImage::owned(src.bounds(), collect(src, |x, y| src.rgb_at(x, y)))
}

fn to_rgba(src: &dyn PixelSource) -> CanonicalImage<'static, Rgba<u8>> {
    CanonicalImage::owned(src.bounds(), collect(src, |x, y| src.rgba_at(x, y)))
}
