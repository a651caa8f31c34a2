//! Benchmarks for layout chain composition.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tessera_render::{FilterRegistry, Renderer};
use tessera_store::{Layout, MemoryStore, Page};

/// Generate markdown content with the given number of sections.
fn generate_markdown(sections: usize) -> String {
    let mut md = String::with_capacity(sections * 120);
    md.push_str("# Document Title\n\n");
    for i in 0..sections {
        md.push_str(&format!(
            "## Section {i}\n\nParagraph in section {i} with **bold** and *italic* text.\n\n"
        ));
    }
    md
}

/// A store whose page sits inside `depth` nested layouts.
fn nested_store(depth: usize, body: &str) -> (MemoryStore, Page) {
    let page = Page::new("index.md")
        .with_layout("layout0")
        .with_filters(["markdown"]);
    let mut store = MemoryStore::new().with_page(page.clone(), body);

    for level in 0..depth {
        let mut layout = Layout::new(format!("layouts/layout{level}.html")).with_filters(["template"]);
        if level + 1 < depth {
            layout = layout.with_layout(format!("layout{}", level + 1));
        }
        store = store.with_layout(layout, format!("<div class=\"l{level}\">{{{{ content }}}}</div>"));
    }

    (store, page)
}

fn bench_layout_depth(c: &mut Criterion) {
    let body = generate_markdown(10);
    let filters = Arc::new(FilterRegistry::with_builtins());
    let mut group = c.benchmark_group("layout_depth");

    for depth in [1, 3, 8] {
        let (store, page) = nested_store(depth, &body);
        let renderer = Renderer::new(page, Arc::new(store), Arc::clone(&filters)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &renderer, |b, r| {
            b.iter(|| r.layout_page().unwrap());
        });
    }

    group.finish();
}

fn bench_body_size(c: &mut Criterion) {
    let filters = Arc::new(FilterRegistry::with_builtins());
    let mut group = c.benchmark_group("body_size");

    for sections in [5, 50, 200] {
        let body = generate_markdown(sections);
        let (store, page) = nested_store(2, &body);
        let renderer = Renderer::new(page, Arc::new(store), Arc::clone(&filters)).unwrap();

        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("sections", sections), &renderer, |b, r| {
            b.iter(|| r.layout_page().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout_depth, bench_body_size);
criterion_main!(benches);
