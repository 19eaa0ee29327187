use super::Strategy;
use crate::{genome::Genome, innovation::InnoGen, random::Happens};
use rand::Rng;
use tracing::trace;

/// Deletes a random connection, along with any hidden node left without connections.
/// Genomes with fewer than 2 connections are left alone, so no genome is ever emptied.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteConnection;

impl Strategy for DeleteConnection {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        if parent.len() < 2 {
            return None;
        }

        let delete_idx = rng.random_range(0..parent.len());
        let genes = parent.genes().spliced(Some(delete_idx), &[]);
        let deleted = parent.genes().conns()[delete_idx];

        let orphaned = |id: usize| {
            parent.contains_hidden(id)
                && !genes
                    .conns()
                    .iter()
                    .any(|c| c.source == id || c.target == id)
        };
        let orphans = [deleted.source, deleted.target]
            .into_iter()
            .filter(|&id| orphaned(id))
            .collect::<Vec<_>>();

        let hidden = parent
            .hidden_nodes()
            .iter()
            .copied()
            .filter(|id| !orphans.contains(id))
            .collect();
        trace!(parent = parent.id(), ?deleted, ?orphans, "deleting connection");

        Some(Genome::with_hidden(
            *parent.meta(),
            inno.genome_ids.next(),
            inno.generation.peek(),
            genes,
            hidden,
        ))
    }
}
