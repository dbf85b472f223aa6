//! Criterion benchmarks for hot paths in taskd.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - Create-request body parsing (serde_json)
//!   - Task list serialization (the GET /tasks response body)
//!   - Description normalization

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::Value;
use taskd::storage::{normalize_description, Task};

// ─── Request parsing ─────────────────────────────────────────────────────────

static CREATE_BODY: &str = r#"{ "description": "  Ship the quarterly report and archive the drafts  " }"#;

fn bench_request_parse(c: &mut Criterion) {
    c.bench_function("create_body_parse", |b| {
        b.iter(|| {
            let v: Value = serde_json::from_str(black_box(CREATE_BODY)).unwrap();
            black_box(v);
        });
    });
}

// ─── Response serialization ──────────────────────────────────────────────────

fn sample_task(i: usize) -> Task {
    Task {
        id: format!("0b6a0cf1-1d9e-4f39-9aa9-1b9e3f3a{i:04x}"),
        description: format!("task number {i} with a realistic amount of text"),
        created_at: "2025-11-07T09:14:32.123456789+00:00".to_string(),
    }
}

fn bench_task_serialize(c: &mut Criterion) {
    c.bench_function("task_serialize_single", |b| {
        let task = sample_task(0);
        b.iter(|| {
            let s = serde_json::to_string(black_box(&task)).unwrap();
            black_box(s);
        });
    });

    c.bench_function("task_serialize_list_100", |b| {
        let tasks: Vec<Task> = (0..100).map(sample_task).collect();
        b.iter(|| {
            let s = serde_json::to_string(black_box(&tasks)).unwrap();
            black_box(s);
        });
    });
}

// ─── Description normalization ───────────────────────────────────────────────
//
// Runs on every create, including rejected ones.

fn bench_normalize(c: &mut Criterion) {
    let padded = format!("{}buy milk{}", " ".repeat(64), " ".repeat(64));

    c.bench_function("normalize_description_padded", |b| {
        b.iter(|| {
            let out = normalize_description(black_box(padded.as_str())).unwrap();
            black_box(out);
        });
    });

    c.bench_function("normalize_description_clean", |b| {
        b.iter(|| {
            let out = normalize_description(black_box("buy milk")).unwrap();
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_request_parse,
    bench_task_serialize,
    bench_normalize
);
criterion_main!(benches);
