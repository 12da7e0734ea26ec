//! Performance benchmarks for full-scan queries.
//!
//! Run with: cargo bench
//!
//! Every query rescans and decodes the whole entries directory, so these
//! benchmarks track how that cost grows with corpus size for:
//! - Listing all entries
//! - Keyword search
//! - The memories query

use chrono::{Duration, NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use daybook::entry::record::Record;
use daybook::images::DirImageStore;
use daybook::{EntryId, EntryStore, QueryEngine};
use tempfile::TempDir;

const CORPUS_SIZES: [usize; 3] = [100, 1_000, 3_000];

/// Writes `count` daily entries ending on 2025-06-30.
fn build_corpus(count: usize) -> (TempDir, EntryStore<DirImageStore>) {
    let temp_dir = TempDir::new().expect("create temp dir");
    let images = DirImageStore::new(temp_dir.path().join("images"), 1024 * 1024);
    let store = EntryStore::new(temp_dir.path().join("entries"), images);
    store.ensure_dir().expect("create entries dir");

    let last = NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date");
    let time = NaiveTime::from_hms_opt(8, 30, 0).expect("valid time");
    for i in 0..count {
        let date = last - Duration::days(i as i64);
        let body = format!(
            "Mood: steady\nTags: day{}, routine\n\nEntry number {} about walks and work.",
            i % 7,
            i
        );
        let record = Record::new(format!("Day {}", i), vec![], body);
        store
            .save(&EntryId::encode(date, time), &record)
            .expect("save entry");
    }

    (temp_dir, store)
}

fn bench_list_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_all");
    group.sample_size(20);

    for size in CORPUS_SIZES {
        let (_temp_dir, store) = build_corpus(size);
        let engine = QueryEngine::new(&store);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &engine, |b, engine| {
            b.iter(|| black_box(engine.list_all().expect("list entries")));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    for size in CORPUS_SIZES {
        let (_temp_dir, store) = build_corpus(size);
        let engine = QueryEngine::new(&store);

        group.bench_with_input(BenchmarkId::from_parameter(size), &engine, |b, engine| {
            b.iter(|| black_box(engine.search(black_box("walks")).expect("search")));
        });
    }

    group.finish();
}

fn bench_memories(c: &mut Criterion) {
    let mut group = c.benchmark_group("memories");
    group.sample_size(20);

    let reference = NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date");
    for size in CORPUS_SIZES {
        let (_temp_dir, store) = build_corpus(size);
        let engine = QueryEngine::new(&store);

        group.bench_with_input(BenchmarkId::from_parameter(size), &engine, |b, engine| {
            b.iter(|| black_box(engine.memories(black_box(reference)).expect("memories")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_list_all, bench_search, bench_memories);
criterion_main!(benches);
