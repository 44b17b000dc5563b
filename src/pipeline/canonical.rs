//! The three pixel layouts the encoder entry points accept.

use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::{Rgb, Rgba};

use crate::pixel::Rect;

/// Layout of a [`Canonical`] image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalLayout {
    Gray8,
    Rgb8,
    Rgba8,
}

/// Pixels that are either borrowed from the caller or converted into a new buffer.
#[derive(Clone, Debug)]
pub enum Pixels<'a, P> {
    Borrowed(ImgRef<'a, P>),
    Owned(ImgVec<P>),
}

impl<P> Pixels<'_, P> {
    pub fn view(&self) -> ImgRef<'_, P> {
        match self {
            Pixels::Borrowed(img) => *img,
            Pixels::Owned(img) => img.as_ref(),
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, Pixels::Borrowed(_))
    }
}

/// Pixels plus the rectangle they cover in the source coordinate space.
#[derive(Clone, Debug)]
pub struct CanonicalImage<'a, P> {
    rect: Rect,
    pixels: Pixels<'a, P>,
}

impl<'a, P: Copy + Default> CanonicalImage<'a, P> {
    pub(crate) fn borrowed(rect: Rect, img: ImgRef<'a, P>) -> Self {
        CanonicalImage {
            rect,
            pixels: Pixels::Borrowed(img),
        }
    }

    /// Take ownership of row-major pixels covering `rect`.
    pub(crate) fn owned(rect: Rect, mut buf: Vec<P>) -> Self {
        let (width, height) = (rect.width(), rect.height());
        // imgref rejects a zero stride, and every row must be backed.
        let stride = width.max(1);
        buf.resize(stride * height, P::default());
        CanonicalImage {
            rect,
            pixels: Pixels::Owned(ImgVec::new_stride(buf, width, height, stride)),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn view(&self) -> ImgRef<'_, P> {
        self.pixels.view()
    }

    pub fn pixels(&self) -> &Pixels<'a, P> {
        &self.pixels
    }
}

/// A normalized image: 8-bit gray, RGB, or straight-alpha RGBA.
#[derive(Clone, Debug)]
pub enum Canonical<'a> {
    Gray8(CanonicalImage<'a, u8>),
    Rgb8(CanonicalImage<'a, Rgb<u8>>),
    Rgba8(CanonicalImage<'a, Rgba<u8>>),
}

impl Canonical<'_> {
    pub fn layout(&self) -> CanonicalLayout {
        match self {
            Canonical::Gray8(_) => CanonicalLayout::Gray8,
            Canonical::Rgb8(_) => CanonicalLayout::Rgb8,
            Canonical::Rgba8(_) => CanonicalLayout::Rgba8,
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            Canonical::Gray8(img) => img.rect(),
            Canonical::Rgb8(img) => img.rect(),
            Canonical::Rgba8(img) => img.rect(),
        }
    }

    /// True when no pixels were copied out of the caller's buffer.
    pub fn is_borrowed(&self) -> bool {
        match self {
            Canonical::Gray8(img) => img.pixels().is_borrowed(),
            Canonical::Rgb8(img) => img.pixels().is_borrowed(),
            Canonical::Rgba8(img) => img.pixels().is_borrowed(),
        }
    }

    /// Width and height of the pixel view.
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Canonical::Gray8(img) => (img.view().width(), img.view().height()),
            Canonical::Rgb8(img) => (img.view().width(), img.view().height()),
            Canonical::Rgba8(img) => (img.view().width(), img.view().height()),
        }
    }
}
