use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use seqopt_core::config::OptimizerConfig;
use seqopt_core::sequence::random_dna_sequence;
use seqopt_core::specification::{
    AvoidNonuniqueSegments, AvoidPattern, EnforceGcContent, Specification,
};
use seqopt_core::{DnaOptimizationProblem, Location, SpecificationRule};

use criterion_config::configure_criterion;

const SEQUENCE_LENGTHS: [usize; 3] = [1_000, 10_000, 50_000];

fn constraints() -> Vec<Specification> {
    vec![
        Specification::from(EnforceGcContent::new(0.3, 0.7, Some(50)).unwrap()),
        Specification::from(AvoidPattern::new("GGTCTC".parse().unwrap())),
        Specification::from(AvoidNonuniqueSegments::new(12, true).unwrap()),
    ]
}

fn problem(length: usize) -> DnaOptimizationProblem {
    let mut rng = Pcg32::seed_from_u64(1);
    let sequence = random_dna_sequence(length, &mut rng);
    DnaOptimizationProblem::new(&sequence, constraints(), Vec::new(), OptimizerConfig::default())
        .unwrap()
}

/// Full sweep against the localized rules a single mutation would trigger.
fn bench_full_vs_localized(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    for length in SEQUENCE_LENGTHS {
        let problem = problem(length);
        let mutation = Location::new(length / 2, length / 2 + 2).unwrap();
        let localized: Vec<Specification> = problem
            .constraints()
            .iter()
            .map(|spec| spec.localized(&mutation))
            .filter(|spec| !spec.is_void())
            .collect();

        group.throughput(Throughput::Bytes(length as u64));
        group.bench_with_input(BenchmarkId::new("full", length), &problem, |b, problem| {
            b.iter(|| black_box(problem.constraints_evaluations().unwrap()));
        });
        group.bench_with_input(
            BenchmarkId::new("localized", length),
            &problem,
            |b, problem| {
                b.iter(|| {
                    for spec in &localized {
                        black_box(spec.evaluate(problem).unwrap());
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.sample_size(10);

    for length in [1_000, 5_000] {
        let problem = problem(length);
        group.bench_with_input(BenchmarkId::new("resolve", length), &problem, |b, problem| {
            b.iter(|| {
                let mut problem = problem.clone();
                black_box(problem.resolve_constraints(false))
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_full_vs_localized, bench_resolution
}
criterion_main!(benches);
