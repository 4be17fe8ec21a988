use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use taskgraph_core::graph::condense::Condensation;
use taskgraph_core::graph::paths::longest_paths;
use taskgraph_core::graph::scc::find_sccs;
use taskgraph_core::graph::topo::topological_order;
use taskgraph_core::{Graph, NullSink, run_pipeline};

#[derive(Debug, Clone, Copy)]
struct Tier {
    name: &'static str,
    nodes: usize,
    edges_per_node: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        nodes: 1_000,
        edges_per_node: 3,
    },
    Tier {
        name: "medium",
        nodes: 10_000,
        edges_per_node: 4,
    },
    Tier {
        name: "large",
        nodes: 100_000,
        edges_per_node: 4,
    },
];

/// Random graph; `back_edge_pct` percent of edges point backwards and form cycles.
fn generate(tier: Tier, back_edge_pct: u32, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(tier.nodes, true);
    for _ in 0..tier.nodes * tier.edges_per_node {
        let a = rng.gen_range(0..tier.nodes);
        let b = rng.gen_range(0..tier.nodes);
        if a == b {
            continue;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (from, to) = if rng.gen_range(0..100) < back_edge_pct {
            (hi, lo)
        } else {
            (lo, hi)
        };
        let _ = graph.add_edge(from, to, rng.gen_range(1..100));
    }
    graph
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline.stages");

    for tier in TIERS {
        let cyclic = generate(tier, 5, 0x7A5C_u64 + tier.nodes as u64);
        let acyclic = generate(tier, 0, 0xDA6_u64 + tier.nodes as u64);
        group.throughput(Throughput::Elements(cyclic.edge_count() as u64));

        group.bench_with_input(BenchmarkId::new("tarjan", tier.name), &cyclic, |b, g| {
            b.iter(|| black_box(find_sccs(g, &mut NullSink)));
        });

        let components = find_sccs(&cyclic, &mut NullSink);
        group.bench_with_input(
            BenchmarkId::new("condense", tier.name),
            &(&cyclic, &components),
            |b, (g, components)| b.iter(|| black_box(Condensation::build(g, components))),
        );

        group.bench_with_input(BenchmarkId::new("kahn", tier.name), &acyclic, |b, g| {
            b.iter(|| black_box(topological_order(g, &mut NullSink)));
        });

        group.bench_with_input(BenchmarkId::new("longest", tier.name), &acyclic, |b, g| {
            b.iter(|| black_box(longest_paths(g, 0, &mut NullSink)));
        });
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline.end_to_end");
    group.sample_size(20);

    for tier in TIERS {
        let acyclic = generate(tier, 0, 0xE2E_u64 + tier.nodes as u64);
        group.throughput(Throughput::Elements(acyclic.edge_count() as u64));
        group.bench_with_input(BenchmarkId::new("dag", tier.name), &acyclic, |b, g| {
            b.iter(|| black_box(run_pipeline(g)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages, bench_end_to_end);
criterion_main!(benches);
