use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifimage::{block::Block, Decoder, Encoder, Frame, GifImage};
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::Cursor;

/// Build a true color animation of a moving gradient
fn animation() -> GifImage {
    let mut image = GifImage::new();
    image.set_default_delay_time_cs(Some(4));
    for n in 0..8u32 {
        let mut pixels = Vec::with_capacity(96 * 96);
        for y in 0..96u32 {
            for x in 0..96u32 {
                let r = ((x * 8 + n * 16) % 256) as u8;
                let g = ((y * 8) % 256) as u8;
                pixels.push(SRgba8::new(r, g, 0x80, 0xFF));
            }
        }
        image.add_frame(Frame::with_true_color(Raster::with_pixels(
            96, 96, pixels,
        )));
    }
    image
}

fn encode_image(crit: &mut Criterion) {
    let image = animation();
    crit.bench_function("encode_image", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(65536);
            image.save(black_box(&mut bytes)).unwrap();
            black_box(bytes);
        })
    });
}

fn encode_blocks(crit: &mut Criterion) {
    let mut gif = vec![];
    animation().save(&mut gif).unwrap();
    let blocks: Vec<Block> = Decoder::new(Cursor::new(&gif[..]))
        .into_blocks()
        .map(|b| b.unwrap())
        .collect();
    crit.bench_function("encode_blocks", |b| {
        b.iter(|| {
            let mut encoder =
                Encoder::new(Cursor::new(black_box(Vec::with_capacity(65536))))
                    .into_block_enc();
            for block in &blocks {
                encoder.encode(black_box(block.clone())).unwrap();
            }
        })
    });
}

criterion_group!(benches, encode_image, encode_blocks);
criterion_main!(benches);
