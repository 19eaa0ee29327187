use core::cmp::Ordering;
use criterion::Criterion;
use espeon::{
    crossover,
    crossover::{correlate, CorrelationCounts},
    delta,
    mutate::MutationSettings,
    population_init,
    random::ProbBinding,
    AsexualReproduction, DeltaCoefficients, Genome, InnoGen, MetaGenome, Strategy,
};

fn grown(meta: &MetaGenome, steps: usize, inno: &mut InnoGen) -> Genome {
    let mut rng = ProbBinding::default();
    let settings = MutationSettings {
        weights: 0.2,
        add_node: 0.3,
        add_connection: 0.5,
        delete_connection: 0.,
    };
    let mut reproduce = AsexualReproduction::new(meta, &settings, Default::default()).unwrap();
    let mut genome = population_init(meta, 1, 1., inno, &mut rng).remove(0);
    for _ in 0..steps {
        genome = reproduce.create_child(&genome, inno, &mut rng).unwrap();
    }
    genome
}

fn bench_crossover(bench: &mut Criterion) {
    let meta = MetaGenome::new(8, 4, true);
    let mut inno = InnoGen::new(&meta);
    let l = grown(&meta, 200, &mut inno);
    let r = grown(&meta, 200, &mut inno);
    let mut rng = ProbBinding::default();

    bench.bench_function("crossover-ne", |b| {
        b.iter(|| crossover(&l, &r, Ordering::Greater, &mut inno, &mut rng).unwrap())
    });

    bench.bench_function("crossover-eq", |b| {
        b.iter(|| crossover(&l, &r, Ordering::Equal, &mut inno, &mut rng).unwrap())
    });

    bench.bench_function("correlate", |b| {
        b.iter(|| correlate(l.genes(), r.genes()).count())
    });

    bench.bench_function("disjoint-excess-count", |b| {
        b.iter(|| CorrelationCounts::of(l.genes(), r.genes()))
    });

    let coefficients = DeltaCoefficients::default();
    bench.bench_function("delta", |b| {
        b.iter(|| delta(l.genes(), r.genes(), &coefficients))
    });
}

pub fn benches() {
    #[cfg(not(feature = "smol_bench"))]
    let mut criterion: criterion::Criterion<_> = Criterion::default()
        .sample_size(1000)
        .significance_level(0.1);
    #[cfg(feature = "smol_bench")]
    let mut criterion: criterion::Criterion<_> = {
        use core::time::Duration;
        Criterion::default()
            .measurement_time(Duration::from_millis(1))
            .sample_size(10)
            .nresamples(1)
            .without_plots()
            .configure_from_args()
    };
    bench_crossover(&mut criterion);
}

fn main() {
    benches();
    criterion::Criterion::default()
        .configure_from_args()
        .final_summary();
}
