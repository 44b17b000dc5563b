//! libwebp backend, through the `webp` and `libwebp-sys` crates.

use alloc::format;
use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use libwebp_sys::WebPImageHint;
use rgb::{Rgb, Rgba};
use webp::{Encoder, WebPConfig};

use super::EncodeBackend;
use crate::config::{AlphaFiltering, DEFAULT_QUALITY, FilterType, ImageHint, ResolvedOptions};
use crate::decode::{DecodeOutput, DecodedPixels};
use crate::pipeline::EntryPoint;
use crate::CodecError;

/// Quality libwebp's one-call lossless API encodes with.
const LOSSLESS_QUALITY: f32 = 70.0;

/// Encoder backend over the system libwebp.
#[derive(Clone, Copy, Debug, Default)]
pub struct LibWebp;

impl LibWebp {
    pub fn new() -> Self {
        LibWebp
    }
}

/// A `WebPConfig` at libwebp's defaults.
fn base_config(entry: EntryPoint) -> Result<WebPConfig, CodecError> {
    WebPConfig::new().map_err(|()| CodecError::encode(entry, "libwebp rejected the config version"))
}

/// Quality as libwebp accepts it: `0..=100`, NaN falling back to the default.
fn sanitize_quality(quality: f32) -> f32 {
    if quality.is_nan() {
        DEFAULT_QUALITY
    } else {
        quality.clamp(0.0, 100.0)
    }
}

fn lossy_config(entry: EntryPoint, quality: f32) -> Result<WebPConfig, CodecError> {
    let mut config = base_config(entry)?;
    config.quality = sanitize_quality(quality);
    Ok(config)
}

fn lossless_config(entry: EntryPoint, exact: bool) -> Result<WebPConfig, CodecError> {
    let mut config = base_config(entry)?;
    config.lossless = 1;
    config.quality = LOSSLESS_QUALITY;
    config.exact = i32::from(exact);
    Ok(config)
}

/// Map every resolved option onto a `WebPConfig`. libwebp validates the result.
fn advanced_config(entry: EntryPoint, o: &ResolvedOptions) -> Result<WebPConfig, CodecError> {
    let mut config = base_config(entry)?;
    config.lossless = i32::from(o.lossless);
    config.quality = sanitize_quality(o.quality);
    config.method = i32::from(o.method);
    config.image_hint = match o.image_hint {
        ImageHint::Default => WebPImageHint::WEBP_HINT_DEFAULT,
        ImageHint::Picture => WebPImageHint::WEBP_HINT_PICTURE,
        ImageHint::Photo => WebPImageHint::WEBP_HINT_PHOTO,
        ImageHint::Graph => WebPImageHint::WEBP_HINT_GRAPH,
    };
    config.target_size = i32::try_from(o.target_size).unwrap_or(i32::MAX);
    config.target_PSNR = o.target_psnr;
    config.segments = i32::from(o.segments);
    config.sns_strength = i32::from(o.sns_strength);
    config.filter_strength = i32::from(o.filter_strength);
    config.filter_sharpness = i32::from(o.filter_sharpness);
    config.filter_type = match o.filter_type {
        FilterType::Simple => 0,
        FilterType::Strong => 1,
    };
    config.autofilter = i32::from(o.autofilter);
    config.alpha_compression = i32::from(o.alpha_compression);
    config.alpha_filtering = match o.alpha_filtering {
        AlphaFiltering::None => 0,
        AlphaFiltering::Fast => 1,
        AlphaFiltering::Best => 2,
    };
    config.pass = i32::from(o.pass);
    config.show_compressed = i32::from(o.show_compressed);
    config.preprocessing = i32::from(o.preprocessing);
    config.partitions = i32::from(o.partitions);
    config.partition_limit = i32::from(o.partition_limit);
    config.emulate_jpeg_size = i32::from(o.emulate_jpeg_size);
    config.thread_level = i32::from(o.thread_level);
    config.low_memory = i32::from(o.low_memory);
    config.near_lossless = i32::from(o.near_lossless);
    config.exact = i32::from(o.exact);
    config.use_delta_palette = i32::from(o.use_delta_palette);
    config.use_sharp_yuv = i32::from(o.use_sharp_yuv);
    Ok(config)
}

fn run(entry: EntryPoint, encoder: Encoder<'_>, config: &WebPConfig) -> Result<Vec<u8>, CodecError> {
    let out = encoder
        .encode_advanced(config)
        .map_err(|e| CodecError::encode(entry, format!("{e:?}")))?;
    tracing::debug!(%entry, bytes = out.len(), "libwebp encode done");
    Ok(out.to_vec())
}

/// Gray has no libwebp importer; expand to RGB.
///
/// Empty images keep a non-zero stride so libwebp gets to reject the size.
fn gray_to_rgb(img: ImgRef<'_, u8>) -> ImgVec<Rgb<u8>> {
    let (width, height) = (img.width(), img.height());
    let mut buf: Vec<Rgb<u8>> = img.pixels().map(|v| Rgb::new(v, v, v)).collect();
    if width == 0 {
        buf.resize(height, Rgb::new(0, 0, 0));
    }
    ImgVec::new_stride(buf, width, height, width.max(1))
}

fn encode_rgb_with(
    entry: EntryPoint,
    img: ImgRef<'_, Rgb<u8>>,
    config: &WebPConfig,
) -> Result<Vec<u8>, CodecError> {
    let (buf, width, height) = img.to_contiguous_buf();
    let bytes: &[u8] = bytemuck::cast_slice(buf.as_ref());
    run(entry, Encoder::from_rgb(bytes, width as u32, height as u32), config)
}

fn encode_rgba_with(
    entry: EntryPoint,
    img: ImgRef<'_, Rgba<u8>>,
    config: &WebPConfig,
) -> Result<Vec<u8>, CodecError> {
    let (buf, width, height) = img.to_contiguous_buf();
    let bytes: &[u8] = bytemuck::cast_slice(buf.as_ref());
    run(entry, Encoder::from_rgba(bytes, width as u32, height as u32), config)
}

impl EncodeBackend for LibWebp {
    fn encode_gray(&self, img: ImgRef<'_, u8>, quality: f32) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LossyGray;
        encode_rgb_with(entry, gray_to_rgb(img).as_ref(), &lossy_config(entry, quality)?)
    }

    fn encode_rgb(&self, img: ImgRef<'_, Rgb<u8>>, quality: f32) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LossyRgb;
        encode_rgb_with(entry, img, &lossy_config(entry, quality)?)
    }

    fn encode_rgba(&self, img: ImgRef<'_, Rgba<u8>>, quality: f32) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LossyRgba;
        encode_rgba_with(entry, img, &lossy_config(entry, quality)?)
    }

    fn encode_rgba_with_config(
        &self,
        img: ImgRef<'_, Rgba<u8>>,
        options: &ResolvedOptions,
    ) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::RgbaWithConfig;
        encode_rgba_with(entry, img, &advanced_config(entry, options)?)
    }

    fn encode_lossless_gray(&self, img: ImgRef<'_, u8>) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LosslessGray;
        encode_rgb_with(entry, gray_to_rgb(img).as_ref(), &lossless_config(entry, false)?)
    }

    fn encode_lossless_rgb(&self, img: ImgRef<'_, Rgb<u8>>) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LosslessRgb;
        encode_rgb_with(entry, img, &lossless_config(entry, false)?)
    }

    fn encode_lossless_rgba(&self, img: ImgRef<'_, Rgba<u8>>) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::LosslessRgba;
        encode_rgba_with(entry, img, &lossless_config(entry, false)?)
    }

    fn encode_exact_lossless_rgba(&self, img: ImgRef<'_, Rgba<u8>>) -> Result<Vec<u8>, CodecError> {
        let entry = EntryPoint::ExactLosslessRgba;
        encode_rgba_with(entry, img, &lossless_config(entry, true)?)
    }
}

/// Decode a still WebP image to RGB8 or RGBA8.
pub(crate) fn decode(data: &[u8]) -> Result<DecodeOutput, CodecError> {
    let image = webp::Decoder::new(data)
        .decode()
        .ok_or_else(|| CodecError::Decode(format!("{} bytes are not a still WebP image", data.len())))?;
    let (width, height) = (image.width(), image.height());
    let (w, h) = (width as usize, height as usize);

    let pixels = if image.is_alpha() {
        let px: &[Rgba<u8>] = bytemuck::cast_slice(&image[..]);
        DecodedPixels::Rgba8(ImgVec::new(px.to_vec(), w, h))
    } else {
        let px: &[Rgb<u8>] = bytemuck::cast_slice(&image[..]);
        DecodedPixels::Rgb8(ImgVec::new(px.to_vec(), w, h))
    };
    tracing::debug!(width, height, alpha = image.is_alpha(), "libwebp decode done");

    Ok(DecodeOutput { pixels, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> ImgVec<Rgba<u8>> {
        let mut buf = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                buf.push(Rgba::new((x * 8) as u8, (y * 8) as u8, 128, 255));
            }
        }
        ImgVec::new(buf, width, height)
    }

    #[test]
    fn advanced_config_maps_every_field() {
        let o = ResolvedOptions {
            method: 6,
            image_hint: ImageHint::Graph,
            segments: 3,
            filter_type: FilterType::Simple,
            alpha_filtering: AlphaFiltering::Best,
            use_sharp_yuv: false,
            near_lossless: 60,
            ..ResolvedOptions::default()
        };
        let c = advanced_config(EntryPoint::RgbaWithConfig, &o).unwrap();
        assert_eq!(c.method, 6);
        assert!(matches!(c.image_hint, WebPImageHint::WEBP_HINT_GRAPH));
        assert_eq!(c.segments, 3);
        assert_eq!(c.filter_type, 0);
        assert_eq!(c.alpha_filtering, 2);
        assert_eq!(c.use_sharp_yuv, 0);
        assert_eq!(c.near_lossless, 60);
        assert_eq!(c.quality, 90.0);
        assert_eq!(c.lossless, 0);
    }

    #[test]
    fn lossless_config_uses_fixed_quality() {
        let c = lossless_config(EntryPoint::ExactLosslessRgba, true).unwrap();
        assert_eq!((c.lossless, c.exact), (1, 1));
        assert_eq!(c.quality, LOSSLESS_QUALITY);
    }

    #[test]
    fn gray_round_trips_through_rgb() {
        let buf: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let img = ImgVec::new(buf.clone(), 8, 8);
        let webp = LibWebp.encode_lossless_gray(img.as_ref()).unwrap();
        let out = decode(&webp).unwrap();
        assert!(!out.has_alpha());
        let gray: Vec<u8> = out.into_rgba8().pixels().map(|p| p.g).collect();
        assert_eq!(gray, buf);
    }

    #[test]
    fn strided_input_is_packed_before_encode() {
        let img = gradient(8, 8);
        // View the left half of each row; the stride stays 8.
        let view = img.sub_image(0, 0, 4, 8);
        assert_eq!(view.stride(), 8);
        let webp = LibWebp.encode_exact_lossless_rgba(view).unwrap();
        let out = decode(&webp).unwrap();
        assert_eq!((out.width, out.height), (4, 8));
        let expected: Vec<_> = view.pixels().collect();
        let actual: Vec<_> = out.into_rgba8().pixels().collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn invalid_configuration_is_an_encode_error() {
        let o = ResolvedOptions {
            segments: 9,
            ..ResolvedOptions::default()
        };
        let err = LibWebp.encode_rgba_with_config(gradient(4, 4).as_ref(), &o).unwrap_err();
        match err {
            CodecError::Encode { entry, message } => {
                assert_eq!(entry, EntryPoint::RgbaWithConfig);
                assert!(message.contains("INVALID_CONFIGURATION"), "{message}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn nan_quality_falls_back_to_default() {
        let c = lossy_config(EntryPoint::LossyRgb, f32::NAN).unwrap();
        assert_eq!(c.quality, DEFAULT_QUALITY);
        let o = ResolvedOptions {
            quality: f32::NAN,
            ..ResolvedOptions::default()
        };
        let c = advanced_config(EntryPoint::RgbaWithConfig, &o).unwrap();
        assert_eq!(c.quality, DEFAULT_QUALITY);
        assert_eq!(sanitize_quality(250.0), 100.0);
        assert_eq!(sanitize_quality(-3.0), 0.0);
        assert_eq!(sanitize_quality(f32::INFINITY), 100.0);
    }

    #[test]
    fn empty_gray_is_rejected_by_libwebp() {
        let buf = [0u8; 5];
        let img = ImgRef::new_stride(&buf[..], 0, 5, 1);
        let expanded = gray_to_rgb(img);
        assert_eq!((expanded.width(), expanded.height()), (0, 5));

        for (entry, result) in [
            (EntryPoint::LossyGray, LibWebp.encode_gray(img, 90.0)),
            (EntryPoint::LosslessGray, LibWebp.encode_lossless_gray(img)),
        ] {
            match result.unwrap_err() {
                CodecError::Encode { entry: got, message } => {
                    assert_eq!(got, entry);
                    assert!(message.contains("BAD_DIMENSION"), "{message}");
                }
                other => panic!("unexpected error {other}"),
            }
        }
    }

    #[test]
    fn garbage_does_not_decode() {
        let err = decode(b"RIFF\0\0\0\0WEBPVP8 ").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
