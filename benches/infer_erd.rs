use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docstore_erd::erd::{self, ErdFormat};
use docstore_erd::schema::ERD_SAMPLE_LIMIT;
use docstore_erd::source::MemorySource;
use serde_json::json;

/// Chained fixture: collection `entry{i}s` references `entry{i-1}s`.
fn fixture(collections: usize, docs_per_collection: usize) -> MemorySource {
    let mut source = MemorySource::new();
    for i in 0..collections {
        let docs = (0..docs_per_collection)
            .map(|d| {
                let mut doc = json!({
                    "_id": {"$oid": format!("{:024x}", i * 1000 + d)},
                    "name": format!("doc-{d}"),
                    "meta": {"created": {"$date": "2024-01-01T00:00:00Z"}, "active": d % 2 == 0},
                    "tags": ["a", "b"]
                });
                if i > 0 {
                    doc["entry".to_string() + &(i - 1).to_string() + "Id"] =
                        json!({"$oid": format!("{:024x}", (i - 1) * 1000)});
                }
                doc
            })
            .collect();
        source.insert(format!("entry{i}s"), docs);
    }
    source
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer_erd");

    for &collections in &[4usize, 16, 64] {
        let source = fixture(collections, ERD_SAMPLE_LIMIT);
        group.bench_function(BenchmarkId::new("generate_mermaid", collections), |b| {
            b.iter(|| {
                let report = erd::generate(
                    black_box(&source),
                    None,
                    ErdFormat::Mermaid,
                    ERD_SAMPLE_LIMIT,
                )
                .expect("generate erd");
                black_box(report.stats.collections)
            })
        });
    }

    group.finish();
}

criterion_group!(name = benches; config = Criterion::default(); targets = bench_generate);
criterion_main!(benches);
