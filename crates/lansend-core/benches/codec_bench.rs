//! Criterion benchmarks for the LanSend text codec.
//!
//! The codec runs once per broadcast tick (advertisement) and once per
//! connection (frame header), so absolute throughput barely matters — these
//! benches exist to catch accidental algorithmic regressions such as a
//! decoder that rescans the whole buffer per call.
//!
//! Run with:
//! ```bash
//! cargo bench --package lansend-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lansend_core::{
    decode_advertisement, decode_header, encode_advertisement, encode_header, Advertisement,
    FrameHeader, PayloadKind,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_advertisement() -> Advertisement {
    Advertisement::new("192.168.1.23".parse().unwrap(), 50001)
}

fn make_file_header() -> FrameHeader {
    FrameHeader::new(PayloadKind::File, "holiday-video.mkv", 734_003_200)
}

fn make_folder_header() -> FrameHeader {
    FrameHeader::new(PayloadKind::Folder, "project-src.zip", 81_920)
}

fn make_long_name_header() -> FrameHeader {
    FrameHeader::new(PayloadKind::File, "n".repeat(255), 1)
}

// ── Benches ───────────────────────────────────────────────────────────────────

fn bench_advertisement(c: &mut Criterion) {
    let ad = make_advertisement();
    let datagram = encode_advertisement(&ad);

    c.bench_function("encode_advertisement", |b| {
        b.iter(|| encode_advertisement(black_box(&ad)))
    });
    c.bench_function("decode_advertisement", |b| {
        b.iter(|| decode_advertisement(black_box(&datagram)).unwrap())
    });
}

fn bench_header(c: &mut Criterion) {
    let fixtures = [
        ("file", make_file_header()),
        ("folder", make_folder_header()),
        ("long_name", make_long_name_header()),
    ];

    let mut group = c.benchmark_group("header_codec");
    for (name, header) in &fixtures {
        let encoded = encode_header(header).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", name), header, |b, h| {
            b.iter(|| encode_header(black_box(h)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, bytes| {
            b.iter(|| decode_header(black_box(bytes)).unwrap())
        });
    }
    group.finish();
}

fn bench_decode_with_body_in_buffer(c: &mut Criterion) {
    // Receivers usually over-read: the buffer holds the header plus the
    // first chunk of the body.  Decode cost must not scale with the surplus.
    let mut buffer = encode_header(&make_file_header()).unwrap();
    buffer.extend(std::iter::repeat(0xA5u8).take(4096));

    c.bench_function("decode_header_with_4k_body_buffered", |b| {
        b.iter(|| decode_header(black_box(&buffer)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_advertisement,
    bench_header,
    bench_decode_with_body_in_buffer
);
criterion_main!(benches);
