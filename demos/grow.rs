//! Grows a population of acyclic genomes towards a target depth, alternating between
//! complexifying and simplifying whenever genomes get too large.
//!
//! `RUST_LOG=debug cargo run --example grow` shows mutation fallbacks as well.

use espeon::{
    crossover,
    graph::AcyclicDepth,
    mutate::{ComplexityMode, MutationSettings, WeightMutationScheme},
    population_init,
    random::{default_rng, EvolutionEvent, ProbBinding, ProbStatic},
    AsexualReproduction, Genome, InnoGen, MetaGenome, Save, Strategy,
};
use rand::{seq::IndexedRandom, Rng};
use std::{env::temp_dir, error::Error};
use tracing::info;
use tracing_subscriber::EnvFilter;

const POPULATION: usize = 150;
const GENERATIONS: usize = 200;
const TARGET_DEPTH: usize = 6;
const SIMPLIFY_ABOVE: f64 = 60.;
const COMPLEXIFY_BELOW: f64 = 30.;

fn fitness(genome: &Genome) -> f64 {
    let depth = AcyclicDepth::of(genome.digraph()).map_or(0, |d| d.max_depth);
    let weight: f64 = genome.genes().weights().iter().sum();
    -(depth.abs_diff(TARGET_DEPTH) as f64) - 0.01 * genome.len() as f64 - 0.001 * weight.abs()
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let meta = MetaGenome::new(6, 2, true);
    let mut inno = InnoGen::new(&meta);
    let mut rng = ProbBinding::new(
        ProbStatic::default().with_overrides(&[(EvolutionEvent::KeepSecondary, 0)]),
        default_rng(),
    );
    let settings = MutationSettings {
        weights: 0.8,
        add_node: 0.1,
        add_connection: 0.07,
        delete_connection: 0.03,
    };
    let mut reproduce = AsexualReproduction::new(&meta, &settings, WeightMutationScheme::default())?;

    let mut pop = population_init(&meta, POPULATION, 0.25, &mut inno, &mut rng);
    for generation in 0..GENERATIONS {
        let mut scored = pop
            .into_iter()
            .map(|g| {
                let fit = fitness(&g);
                (g, fit)
            })
            .collect::<Vec<_>>();
        scored.sort_by(|(_, l), (_, r)| r.total_cmp(l));

        let mean_len = scored.iter().map(|(g, _)| g.len() as f64).sum::<f64>() / POPULATION as f64;
        match reproduce.mode() {
            ComplexityMode::Complexifying if mean_len > SIMPLIFY_ABOVE => {
                reproduce.set_mode(ComplexityMode::Simplifying)
            }
            ComplexityMode::Simplifying if mean_len < COMPLEXIFY_BELOW => {
                reproduce.set_mode(ComplexityMode::Complexifying)
            }
            _ => (),
        }

        let (champion, best) = &scored[0];
        info!(
            generation,
            best,
            depth = AcyclicDepth::of(champion.digraph()).map_or(0, |d| d.max_depth),
            mean_len,
            mode = ?reproduce.mode(),
            "generation done"
        );

        let elites = &scored[..POPULATION / 4];
        inno.next_generation();
        pop = elites.iter().map(|(g, _)| g.clone()).collect();
        while pop.len() < POPULATION {
            let (l, l_fit) = elites.choose(&mut rng).ok_or("no elites")?;
            let child = if rng.random_bool(0.25) {
                let (r, r_fit) = elites.choose(&mut rng).ok_or("no elites")?;
                crossover(l, r, l_fit.total_cmp(r_fit), &mut inno, &mut rng)?
            } else {
                reproduce
                    .create_child(l, &mut inno, &mut rng)
                    .ok_or("asexual reproduction produced no child")?
            };
            pop.push(child);
        }
    }

    let champion = pop
        .iter()
        .max_by(|l, r| fitness(l).total_cmp(&fitness(r)))
        .ok_or("empty population")?;
    let path = temp_dir().join("espeon-champion.json");
    champion.to_file(&path)?;
    info!(path = %path.display(), len = champion.len(), "saved champion");
    Ok(())
}
