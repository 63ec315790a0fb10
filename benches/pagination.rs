//! Pagination and export benchmarks
//!
//! Measures the layout pass alone and the full note-to-PDF export for notes
//! of increasing length.

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use notepress::{ExportRequest, ExportSettings, ExporterBuilder, GridTableLayout, InMemoryAssetResolver, UnavailableRasterizer};
use notepress_layout::{FontSet, LayoutContext, PaginationEngine, segment_document};
use std::collections::BTreeSet;
use std::hint::black_box;
use tokio::runtime::Runtime;

/// A note mixing headings, emphasis, lists and a table.
fn mixed_note(sections: usize) -> String {
    let mut note = String::from("---\ntags: [bench]\n---\n");
    for i in 1..=sections {
        note.push_str(&format!("## Section {}\n\n", i));
        note.push_str("Some **bold** words, some *italic* ones, `inline code` and a [[Wiki Link|link]].\n");
        note.push_str("- first item\n- second item with ==highlight==\n\t- nested item\n\n");
        note.push_str("| Key | Value |\n|---|---|\n| alpha | 1 |\n| beta | 2 |\n\n");
    }
    note
}

fn benchmark_paginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let settings = ExportSettings::default();
    let resolver = InMemoryAssetResolver::new();

    for sections in [10, 100, 500] {
        let note = mixed_note(sections);
        group.bench_with_input(BenchmarkId::new("sections", sections), &note, |b, note| {
            b.iter(|| {
                let ctx = LayoutContext::new(&settings.layout_config(), FontSet::resolve("helvetica", None).0);
                let blocks = segment_document(note, BTreeSet::new());
                let engine = PaginationEngine::new(&ctx, &resolver, &UnavailableRasterizer, &GridTableLayout);
                let doc = rt
                    .block_on(engine.paginate(&blocks, None))
                    .expect("Failed to paginate");
                black_box(doc.page_count())
            });
        });
    }

    group.finish();
}

fn benchmark_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let exporter = ExporterBuilder::new()
        .with_settings(ExportSettings {
            footnote_enabled: true,
            gutter: true,
            ..Default::default()
        })
        .build()
        .expect("Failed to build exporter");
    let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid timestamp");

    for sections in [10, 100] {
        let note = mixed_note(sections);
        group.bench_with_input(BenchmarkId::new("sections", sections), &note, |b, note| {
            b.iter(|| {
                let request = ExportRequest::new("bench.md", note.as_str(), "bench", timestamp);
                let report = rt.block_on(exporter.export(request)).expect("Failed to export");
                black_box(report.pdf.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_paginate, benchmark_export);
criterion_main!(benches);
