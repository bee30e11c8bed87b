//! Search aggregation benchmarks.
//!
//! Measures one category run end to end over the offline provider, so the
//! numbers cover fan-out, detail resolution, ranking and the category merge
//! without any network noise.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `category/sample` | Every category over the embedded San Francisco set |
//! | `scaling` | A broad category run as the provider grows from 100 to 10k places |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench aggregator_bench
//! open target/criterion/report/index.html
//! ```

use cdm_core::{expand, Category, Coordinate, SearchAggregator};
use cdm_places::FixturePlacesClient;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

const CIVIC_CENTER: Coordinate = Coordinate { latitude: 37.7793, longitude: -122.4193 };

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// `n` places spread over a ~20 km square around the civic center, a third
/// of them matching each broad query term.
fn synthetic_places(n: usize) -> FixturePlacesClient {
    let kinds = ["Charity", "Nonprofit", "Foundation"];
    let records: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let step = (i % 100) as f64 / 100.0 - 0.5;
            let row = (i / 100 % 100) as f64 / 100.0 - 0.5;
            serde_json::json!({
                "id": format!("place-{i}"),
                "name": format!("Neighborhood {} #{i}", kinds[i % kinds.len()]),
                "address": format!("{i} Market St"),
                "latitude": CIVIC_CENTER.latitude + row * 0.18,
                "longitude": CIVIC_CENTER.longitude + step * 0.18,
            })
        })
        .collect();
    FixturePlacesClient::from_json(&serde_json::to_string(&records).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Sample set
// ---------------------------------------------------------------------------

fn category_bench(c: &mut Criterion) {
    let rt = runtime();
    let aggregator = SearchAggregator::new(Arc::new(FixturePlacesClient::sample()));
    let mut group = c.benchmark_group("category/sample");

    for category in [Category::All, Category::Food, Category::Health, Category::Education] {
        let queries = expand(category, None);
        group.bench_function(category.label(), |b| {
            b.to_async(&rt).iter(|| {
                aggregator.run_category(black_box(&queries), Some(CIVIC_CENTER), 5_000.0, 20)
            })
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

fn scaling_bench(c: &mut Criterion) {
    let rt = runtime();
    let queries = expand(Category::All, None);
    let mut group = c.benchmark_group("scaling");

    for n in [100usize, 1_000, 10_000] {
        let aggregator = SearchAggregator::new(Arc::new(synthetic_places(n)));
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.to_async(&rt).iter(|| {
                aggregator.run_category(black_box(&queries), Some(CIVIC_CENTER), 50_000.0, 20)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, category_bench, scaling_bench);
criterion_main!(benches);
