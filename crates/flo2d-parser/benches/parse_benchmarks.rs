//! Benchmarks for the block parser and hydrograph extraction.
//!
//! Run with: cargo bench --package flo2d-parser --bench parse_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flo2d_parser::{extract_channel_series, infer_section_length, parse_blocks, ChannelColumn};
use test_utils::{generate_hychan, generate_timdep};

fn bench_parse_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_blocks");

    for cells in [1_000u64, 10_000, 50_000] {
        let text = generate_timdep(cells, 8, 0.5);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(cells), &text, |b, text| {
            b.iter(|| {
                let records: usize = parse_blocks(black_box(text.as_bytes()))
                    .map(|block| block.map(|b| b.records.len()).unwrap_or(0))
                    .sum();
                black_box(records)
            })
        });
    }

    group.finish();
}

fn bench_hydrograph(c: &mut Criterion) {
    let elements: Vec<u64> = (1..=200).collect();
    let text = generate_hychan(&elements, 96, 0.25);
    let wanted: Vec<String> = (1..=200).step_by(10).map(|e| e.to_string()).collect();

    c.bench_function("hychan_two_phase", |b| {
        b.iter(|| {
            let len = infer_section_length(text.as_bytes()).ok().flatten().unwrap_or(0);
            let extraction =
                extract_channel_series(text.as_bytes(), len, &wanted, ChannelColumn::Elevation);
            black_box(extraction.map(|e| e.series.len()).unwrap_or(0))
        })
    });
}

criterion_group!(benches, bench_parse_blocks, bench_hydrograph);
criterion_main!(benches);
