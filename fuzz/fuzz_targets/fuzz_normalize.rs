#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use webpwrite::pipeline::{CanonicalLayout, normalize};
use webpwrite::pixel::{
    ChromaSubsampling, PixelBuffer, PlanarImage, Rect, SampleDepth, YCbCrImage,
};

#[derive(Debug, Arbitrary)]
struct Input {
    x: i16,
    y: i16,
    width: u8,
    height: u8,
    stride_pad: u8,
    channels: u8,
    wide: bool,
    ycbcr: Option<u8>,
    data: Vec<u8>,
}

const SUBSAMPLING: [ChromaSubsampling; 6] = [
    ChromaSubsampling::S444,
    ChromaSubsampling::S422,
    ChromaSubsampling::S420,
    ChromaSubsampling::S440,
    ChromaSubsampling::S411,
    ChromaSubsampling::S410,
];

fuzz_target!(|input: Input| {
    let rect = Rect::at(
        i32::from(input.x),
        i32::from(input.y),
        usize::from(input.width),
        usize::from(input.height),
    );

    // Construction validates; whatever it accepts must normalize without panicking
    let image = match input.ycbcr {
        Some(s) => {
            let subsampling = SUBSAMPLING[usize::from(s) % SUBSAMPLING.len()];
            let third = input.data.len() / 3;
            let (y, rest) = input.data.split_at(third);
            let (cb, cr) = rest.split_at(third);
            let stride = rect.width() + usize::from(input.stride_pad);
            let c_stride = stride / 2 + 1;
            match YCbCrImage::new(y, cb, cr, stride, c_stride, subsampling, rect) {
                Ok(img) => PixelBuffer::YCbCr(img),
                Err(_) => return,
            }
        }
        None => {
            let depth = if input.wide { SampleDepth::U16 } else { SampleDepth::U8 };
            let row = rect.width() * usize::from(input.channels) * depth.bytes();
            let stride = row + usize::from(input.stride_pad);
            match PlanarImage::new(&input.data, rect, stride, input.channels, depth) {
                Ok(img) => PixelBuffer::Planar(img),
                Err(_) => return,
            }
        }
    };

    let canonical = normalize(&image);
    assert_eq!(canonical.rect(), rect);
    if input.ycbcr.is_some() {
        assert_eq!(canonical.layout(), CanonicalLayout::Rgb8);
    }
});
