//! Benchmarks for mailprep transcoding performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic newsletter markup of increasing length.

use base64::Engine as _;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Embedded PNG header of the given dimensions followed by `padding` bytes.
fn png_data_uri(width: u32, height: u32, padding: usize) -> String {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
    bytes.resize(bytes.len() + padding, 0);
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Creates editor markup with the given number of article sections.
fn create_test_html(sections: usize) -> String {
    let image = png_data_uri(320, 240, 4096);
    let mut html = String::new();

    for i in 0..sections {
        html.push_str(&format!(
            "<h2 style=\"font-size:14pt;color:#ffffff\">Section {}</h2>",
            i + 1
        ));
        html.push_str(&format!(
            "<p><img style=\"float:left;width:120px;margin-right:15px\" src=\"{}\"></p>",
            image
        ));
        html.push_str(
            "<p style=\"line-height:1.5;font-size:9px\">Benchmark text beside the image for \
             mailprep performance measurement.</p>",
        );
        html.push_str("<font size=\"2\" face=\"Verdana\">Legacy footer text</font>");
        html.push_str(&format!(
            "<div><img width=\"200\" style=\"max-width:80%\" src=\"{}\"></div>",
            image
        ));
    }

    html
}

/// Benchmark markup kind detection.
fn bench_detection(c: &mut Criterion) {
    let fragment = create_test_html(1);
    let transcoded = mailprep::transcode(&fragment);

    c.bench_function("detect_fragment", |b| {
        b.iter(|| mailprep::detect_markup(black_box(&fragment)));
    });

    c.bench_function("detect_transcoded", |b| {
        b.iter(|| mailprep::is_transcoded(black_box(&transcoded)));
    });
}

/// Benchmark the full pipeline at various sizes.
fn bench_transcode(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcode");
    let options = mailprep::TranscodeOptions::default();

    for sections in [1, 10, 50].iter() {
        let html = create_test_html(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| mailprep::transcode_with_options(black_box(&html), &options));
        });
    }

    group.finish();
}

/// Benchmark batch conversion against sequential calls.
fn bench_batch(c: &mut Criterion) {
    let inputs: Vec<String> = (0..32).map(|_| create_test_html(2)).collect();
    let options = mailprep::TranscodeOptions::default();

    c.bench_function("batch_32_parallel", |b| {
        b.iter(|| mailprep::transcode_batch(black_box(&inputs), &options));
    });

    c.bench_function("batch_32_sequential", |b| {
        b.iter(|| {
            inputs
                .iter()
                .map(|html| mailprep::transcode_with_options(black_box(html), &options))
                .collect::<Vec<_>>()
        });
    });
}

/// Benchmark style map parsing.
fn bench_style_parse(c: &mut Criterion) {
    let style = "font-family:Verdana, sans-serif;font-size:12pt;line-height:1.5;color:#333;\
                 background:url(data:image/png;base64,AAAA);margin:0 15px 0 0;float:left";

    c.bench_function("style_parse", |b| {
        b.iter(|| mailprep::StyleMap::parse(black_box(style)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_detection,
    bench_transcode,
    bench_batch,
    bench_style_parse,
);
criterion_main!(benches);
