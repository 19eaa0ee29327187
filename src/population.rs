//! Seeding a population of genomes, and moving whole populations to and from disk.

use crate::{
    genome::{ConnectionGene, ConnectionGenes, Genome, MetaGenome},
    graph::DirectedConnection,
    innovation::InnoGen,
    serialize::{Load, Save},
};
use core::error::Error;
use rand::{seq::index::sample, Rng};
use std::{fs::read_dir, path::Path};
use tracing::debug;

/// Every input -> output connection, with the innovation id it holds for the whole run
fn seed_connections(meta: &MetaGenome, inno: &mut InnoGen) -> Vec<(DirectedConnection, usize)> {
    (0..meta.inputs)
        .flat_map(|source| (meta.inputs..meta.fixed()).map(move |target| (source, target)))
        .map(|(source, target)| {
            let conn = DirectedConnection::new(source, target);
            let id = inno.connections.lookup(&conn).unwrap_or_else(|| {
                let id = inno.innovations.next();
                inno.connections.register(conn, id);
                id
            });
            (conn, id)
        })
        .collect()
}

/// Create `size` seed genomes. Each one holds a random `proportion` of the input -> output
/// connections (at least one, when there are any), with weights uniform over the weight range.
/// A connection carries the same innovation id in every genome it appears in.
pub fn population_init(
    meta: &MetaGenome,
    size: usize,
    proportion: f64,
    inno: &mut InnoGen,
    rng: &mut impl Rng,
) -> Vec<Genome> {
    let pairs = seed_connections(meta, inno);
    let count = if pairs.is_empty() {
        0
    } else {
        ((pairs.len() as f64 * proportion).round() as usize).clamp(1, pairs.len())
    };
    debug!(size, pairs = pairs.len(), count, "seeding population");

    (0..size)
        .map(|_| {
            let genes = sample(&mut *rng, pairs.len(), count)
                .into_iter()
                .map(|idx| {
                    let (conn, id) = pairs[idx];
                    ConnectionGene {
                        conn,
                        weight: rng.random_range(-meta.weight_scale..=meta.weight_scale),
                        inno: id,
                    }
                })
                .fold(ConnectionGenes::new(), |mut genes, gene| {
                    genes.insert(gene);
                    genes
                });

            Genome::new(*meta, inno.genome_ids.next(), inno.generation.peek(), genes)
        })
        .collect()
}

/// Write each genome in `pop` to its own json file inside of the directory at `path`
pub fn population_to_files<P: AsRef<Path>>(path: P, pop: &[Genome]) -> Result<(), Box<dyn Error>> {
    for genome in pop {
        genome.to_file(path.as_ref().join(format!("{}.json", genome.id())))?;
    }

    Ok(())
}

/// Load a population from individual files inside of a directory at `path`, with an [InnoGen]
/// whose sequences continue after every id the population holds. Assumes that every file in
/// `path` is a genome, and that all of them share their [MetaGenome].
pub fn population_from_files<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<Genome>, InnoGen), Box<dyn Error>> {
    let mut pop = read_dir(path)?
        .map(|fp| Genome::from_file(fp?.path()))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(meta) = pop.first().map(|g| *g.meta()) else {
        return Err("no genomes".into());
    };
    if pop.iter().any(|g| *g.meta() != meta) {
        return Err("genomes disagree on their meta".into());
    }

    pop.sort_by_key(Genome::id);
    let inno = InnoGen::resumed(&meta, &pop);
    Ok((pop, inno))
}
