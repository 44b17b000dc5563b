#![no_main]
use libfuzzer_sys::fuzz_target;
use webpwrite::pixel::PixelBuffer;
use webpwrite::*;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must survive an exact lossless re-encode unchanged
    let Ok(decoded) = decode(data) else {
        return;
    };
    let (width, height) = (decoded.width, decoded.height);
    let pixels = decoded.into_rgba8();

    let opts = Options::lossless().with_exact(true);
    let Ok(reencoded) = encode_to_vec(&PixelBuffer::from(pixels.as_ref()), Some(&opts)) else {
        panic!("decoded {width}x{height} image failed to re-encode");
    };
    let Ok(decoded2) = decode(&reencoded) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!((decoded2.width, decoded2.height), (width, height));
    assert_eq!(decoded2.into_rgba8().buf(), pixels.buf(), "roundtrip pixel mismatch");
});
