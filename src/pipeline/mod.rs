//! Encode pipeline: normalize -> plan -> run.
//!
//! [`normalize`] turns any [`PixelBuffer`](crate::pixel::PixelBuffer) into a
//! [`Canonical`] image, [`plan`] picks the one encoder entry point that fits
//! the image layout and the resolved options, and [`run`] calls it on an
//! [`EncodeBackend`].

mod canonical;
mod convert;

use alloc::vec::Vec;
use core::fmt;

use crate::CodecError;
use crate::codecs::EncodeBackend;
use crate::config::{EncodePath, ResolvedOptions};

pub use canonical::{Canonical, CanonicalImage, CanonicalLayout, Pixels};
pub use convert::normalize;

/// An entry point of the external encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    LossyGray,
    LossyRgb,
    LossyRgba,
    /// Lossy RGBA with every advanced option applied.
    RgbaWithConfig,
    LosslessGray,
    LosslessRgb,
    LosslessRgba,
    /// Lossless RGBA that keeps color values under fully transparent pixels.
    ExactLosslessRgba,
}

impl EntryPoint {
    pub fn name(self) -> &'static str {
        match self {
            EntryPoint::LossyGray => "lossy-gray",
            EntryPoint::LossyRgb => "lossy-rgb",
            EntryPoint::LossyRgba => "lossy-rgba",
            EntryPoint::RgbaWithConfig => "rgba-with-config",
            EntryPoint::LosslessGray => "lossless-gray",
            EntryPoint::LosslessRgb => "lossless-rgb",
            EntryPoint::LosslessRgba => "lossless-rgba",
            EntryPoint::ExactLosslessRgba => "exact-lossless-rgba",
        }
    }

    pub fn is_lossless(self) -> bool {
        matches!(
            self,
            EntryPoint::LosslessGray
                | EntryPoint::LosslessRgb
                | EntryPoint::LosslessRgba
                | EntryPoint::ExactLosslessRgba
        )
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Choose the entry point for an image layout on an encode path.
///
/// Gray and RGB images have no configurable entry point, so on the advanced
/// path only `lossless` is honored for them.
pub fn plan(path: EncodePath, layout: CanonicalLayout, resolved: &ResolvedOptions) -> EntryPoint {
    use CanonicalLayout::*;
    match (path, layout) {
        (EncodePath::Lossless, Gray8) => EntryPoint::LosslessGray,
        (EncodePath::Lossless, Rgb8) => EntryPoint::LosslessRgb,
        (EncodePath::Lossless, Rgba8) if resolved.exact => EntryPoint::ExactLosslessRgba,
        (EncodePath::Lossless, Rgba8) => EntryPoint::LosslessRgba,

        (EncodePath::LossySimple, Gray8) => EntryPoint::LossyGray,
        (EncodePath::LossySimple, Rgb8) => EntryPoint::LossyRgb,
        (EncodePath::LossySimple, Rgba8) => EntryPoint::LossyRgba,

        (EncodePath::LossyAdvanced, Gray8) if resolved.lossless => EntryPoint::LosslessGray,
        (EncodePath::LossyAdvanced, Gray8) => EntryPoint::LossyGray,
        (EncodePath::LossyAdvanced, Rgb8) if resolved.lossless => EntryPoint::LosslessRgb,
        (EncodePath::LossyAdvanced, Rgb8) => EntryPoint::LossyRgb,
        (EncodePath::LossyAdvanced, Rgba8) => EntryPoint::RgbaWithConfig,
    }
}

/// Call `entry` on `backend`.
///
/// # Panics
///
/// If `entry` was not planned for the image's layout.
pub fn run<B: EncodeBackend + ?Sized>(
    backend: &B,
    entry: EntryPoint,
    image: &Canonical<'_>,
    resolved: &ResolvedOptions,
) -> Result<Vec<u8>, CodecError> {
    let quality = resolved.quality;
    match (entry, image) {
        (EntryPoint::LossyGray, Canonical::Gray8(img)) => backend.encode_gray(img.view(), quality),
        (EntryPoint::LosslessGray, Canonical::Gray8(img)) => {
            backend.encode_lossless_gray(img.view())
        }
        (EntryPoint::LossyRgb, Canonical::Rgb8(img)) => backend.encode_rgb(img.view(), quality),
        (EntryPoint::LosslessRgb, Canonical::Rgb8(img)) => backend.encode_lossless_rgb(img.view()),
        (EntryPoint::LossyRgba, Canonical::Rgba8(img)) => backend.encode_rgba(img.view(), quality),
        (EntryPoint::RgbaWithConfig, Canonical::Rgba8(img)) => {
            backend.encode_rgba_with_config(img.view(), resolved)
        }
        (EntryPoint::LosslessRgba, Canonical::Rgba8(img)) => {
            backend.encode_lossless_rgba(img.view())
        }
        (EntryPoint::ExactLosslessRgba, Canonical::Rgba8(img)) => {
            backend.encode_exact_lossless_rgba(img.view())
        }
        (entry, image) => unreachable!("{entry} planned for a {:?} image", image.layout()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Options, apply_defaults, resolve};

    fn resolved(opts: &Options) -> (ResolvedOptions, EncodePath) {
        resolve(Some(opts))
    }

    #[test]
    fn entry_point_names() {
        assert_eq!(EntryPoint::RgbaWithConfig.to_string(), "rgba-with-config");
        assert_eq!(EntryPoint::ExactLosslessRgba.to_string(), "exact-lossless-rgba");
        assert!(EntryPoint::LosslessGray.is_lossless());
        assert!(!EntryPoint::RgbaWithConfig.is_lossless());
    }

    #[test]
    fn simple_path_table() {
        let (r, path) = resolve(None);
        assert_eq!(path, EncodePath::LossySimple);
        assert_eq!(plan(path, CanonicalLayout::Gray8, &r), EntryPoint::LossyGray);
        assert_eq!(plan(path, CanonicalLayout::Rgb8, &r), EntryPoint::LossyRgb);
        assert_eq!(plan(path, CanonicalLayout::Rgba8, &r), EntryPoint::LossyRgba);
    }

    #[test]
    fn lossless_path_table() {
        let (r, path) = resolved(&Options::lossless());
        assert_eq!(path, EncodePath::Lossless);
        assert_eq!(plan(path, CanonicalLayout::Gray8, &r), EntryPoint::LosslessGray);
        assert_eq!(plan(path, CanonicalLayout::Rgb8, &r), EntryPoint::LosslessRgb);
        assert_eq!(plan(path, CanonicalLayout::Rgba8, &r), EntryPoint::LosslessRgba);

        let exact = ResolvedOptions {
            lossless: true,
            exact: true,
            ..ResolvedOptions::default()
        };
        assert_eq!(
            plan(EncodePath::Lossless, CanonicalLayout::Rgba8, &exact),
            EntryPoint::ExactLosslessRgba
        );
    }

    #[test]
    fn advanced_path_table() {
        let (r, path) = resolved(&Options::new().with_method(6));
        assert_eq!(path, EncodePath::LossyAdvanced);
        assert_eq!(plan(path, CanonicalLayout::Gray8, &r), EntryPoint::LossyGray);
        assert_eq!(plan(path, CanonicalLayout::Rgb8, &r), EntryPoint::LossyRgb);
        assert_eq!(plan(path, CanonicalLayout::Rgba8, &r), EntryPoint::RgbaWithConfig);

        let (r, path) = resolved(&Options::lossless().with_exact(true));
        assert_eq!(path, EncodePath::LossyAdvanced);
        assert_eq!(plan(path, CanonicalLayout::Gray8, &r), EntryPoint::LosslessGray);
        assert_eq!(plan(path, CanonicalLayout::Rgb8, &r), EntryPoint::LosslessRgb);
        assert_eq!(plan(path, CanonicalLayout::Rgba8, &r), EntryPoint::RgbaWithConfig);
    }

    #[test]
    fn advanced_defaults_feed_config_entry() {
        let r = apply_defaults(&Options::new().with_segments(3));
        assert_eq!(r.segments, 3);
        assert_eq!(r.method, 4);
        assert_eq!(plan(EncodePath::LossyAdvanced, CanonicalLayout::Rgba8, &r), EntryPoint::RgbaWithConfig);
    }
}
