use super::Strategy;
use crate::{
    genome::{ConnectionGene, Genome},
    innovation::InnoGen,
    random::Happens,
};
use rand::Rng;
use tracing::trace;

/// Splits a random connection with a new hidden node.
///
/// source -> target becomes source -> node -> target. The incoming connection keeps the split
/// connection's weight and the outgoing one gets the full weight scale, so the signal along the
/// path is roughly preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddNode;

impl Strategy for AddNode {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        if parent.is_empty() {
            return None;
        }

        let split_idx = rng.random_range(0..parent.len());
        let split = parent.genes().gene(split_idx);
        let added = inno.split(split.inno, parent);
        trace!(parent = parent.id(), ?split, ?added, "splitting connection");

        let mut insert = [
            ConnectionGene::new(split.conn.source, added.node, split.weight, added.incoming),
            ConnectionGene::new(
                added.node,
                split.conn.target,
                parent.meta().weight_scale,
                added.outgoing,
            ),
        ];
        if insert[1].conn < insert[0].conn {
            insert.swap(0, 1);
        }

        let genes = parent.genes().spliced(Some(split_idx), &insert);

        let mut hidden = parent.hidden_nodes().to_vec();
        if let Err(pos) = hidden.binary_search(&added.node) {
            hidden.insert(pos, added.node);
        }

        Some(Genome::with_hidden(
            *parent.meta(),
            inno.genome_ids.next(),
            inno.generation.peek(),
            genes,
            hidden,
        ))
    }
}
