// cargo fuzz run decode corpus/decode -- -timeout=30

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use gifimage::{Decoder, GifImage};

fuzz_target!(|data: &[u8]| {
    for frame in Decoder::new(Cursor::new(data)).into_frames() {
        if frame.is_err() {
            break;
        }
    }
    if let Ok(image) = GifImage::load(data) {
        let mut out = vec![];
        let _ = image.save(&mut out);
    }
});
