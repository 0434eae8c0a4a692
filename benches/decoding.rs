//! Benchmarks for dbbdump decoding and rendering.
//!
//! Run with: `cargo bench`
//! Run specific group: `cargo bench --bench decoding -- varint`

use std::io::Write;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tempfile::TempDir;

use dbbdump::dbb::{RecordBuilder, RecordPager, decode_record, varint};
use dbbdump::entity::{ChatMessage, Entity, EntityReader};
use dbbdump::render::{to_html_fragment, to_json_compact, to_json_full};

const MAX_SIZE: usize = 1024;
const STRIDE: usize = MAX_SIZE + 8;

// =============================================================================
// Test Data Generators
// =============================================================================

fn message_slot(i: u32) -> Vec<u8> {
    let partner = if i % 2 == 0 { "bob" } else { "carol" };
    RecordBuilder::new(i)
        .int(3, u64::from(i) + 1000)
        .text(480, &format!("#alice/${partner};{i:x}"))
        .int(485, 1_300_000_000 + u64::from(i) * 60)
        .text(488, partner)
        .text(492, "Display Name")
        .int(497, 3)
        .text(508, &format!("Message number {i} with <markup> & newlines\nsecond line"))
        .text(3160, partner)
        .build_slot(STRIDE)
}

fn write_message_file(count: u32) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("chatmsg{MAX_SIZE}.dbb"));
    let mut file = std::fs::File::create(&path).unwrap();
    for i in 0..count {
        file.write_all(&message_slot(i)).unwrap();
    }
    (dir, path)
}

// =============================================================================
// Decoding Benchmarks
// =============================================================================

fn bench_varint(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    for value in [0x7F_u64, 3160, 1_300_000_000, u64::MAX] {
        let encoded = varint::encode(value);
        group.bench_with_input(BenchmarkId::from_parameter(value), &encoded, |b, buf| {
            b.iter(|| varint::decode(black_box(buf), 0).unwrap());
        });
    }
    group.finish();
}

fn bench_decode_record(c: &mut Criterion) {
    let slot = message_slot(42);
    c.bench_function("decode_record", |b| {
        b.iter(|| decode_record(black_box(&slot)).unwrap());
    });
}

fn bench_read_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_file");

    for count in [100_u32, 1_000, 10_000] {
        let (_dir, path) = write_message_file(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("fields", count), &path, |b, path| {
            b.iter(|| {
                let pager = RecordPager::open(path).unwrap();
                pager.records().map(Result::unwrap).count()
            });
        });
        group.bench_with_input(BenchmarkId::new("messages", count), &path, |b, path| {
            b.iter(|| {
                let reader = EntityReader::<ChatMessage>::open(path).unwrap();
                reader.entities().map(Result::unwrap).count()
            });
        });
    }
    group.finish();
}

// =============================================================================
// Rendering Benchmarks
// =============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let fields = decode_record(&message_slot(7)).unwrap();
    let msg = ChatMessage::from_fields(fields);

    group.bench_function("json_full", |b| b.iter(|| to_json_full(black_box(&msg)).unwrap()));
    group.bench_function("json_compact", |b| {
        b.iter(|| to_json_compact(black_box(&msg)).unwrap());
    });
    group.bench_function("html_fragment", |b| {
        b.iter(|| to_html_fragment(black_box(&msg)));
    });
    group.finish();
}

criterion_group!(decoding, bench_varint, bench_decode_record, bench_read_file);
criterion_group!(rendering, bench_render);
criterion_main!(decoding, rendering);
