//! Rank fusion benchmarks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use uuid::Uuid;

use agentdns::index::{IndexEntry, Ranked};
use agentdns::search::fusion::{fuse, DEFAULT_COEFF};

fn ranked_list(list_seed: u128, len: usize, overlap: usize) -> Vec<Ranked> {
    (0..len)
        .map(|i| {
            // The first `overlap` entries are shared across lists.
            let id = if i < overlap {
                Uuid::from_u128(i as u128)
            } else {
                Uuid::from_u128(list_seed << 64 | i as u128)
            };
            Ranked {
                entry: IndexEntry {
                    id,
                    name: format!("agent-{}", i),
                    address: format!("agentdns://org/agent-{}", i),
                    description: "benchmark entry".to_string(),
                    tags: String::new(),
                },
                rank: i + 1,
            }
        })
        .collect()
}

fn bench_fuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("rrf_fuse");

    for &len in &[10usize, 100, 1000] {
        let lists = vec![
            ranked_list(1, len, len / 2),
            ranked_list(2, len, len / 2),
            ranked_list(3, len, len / 2),
        ];
        group.bench_with_input(BenchmarkId::from_parameter(len), &lists, |b, lists| {
            b.iter(|| fuse(lists, DEFAULT_COEFF, len / 2));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fuse);
criterion_main!(benches);
