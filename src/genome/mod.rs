pub mod connection;
pub use connection::{ConnectionGene, ConnectionGenes};

use crate::{
    constants::ESPEON_CONNECTION_WEIGHT_SCALE,
    error::{GenomeError, GenomeResult},
    graph::{CyclicGraphCheck, DirectedConnection, DirectedGraph, DirectedGraphBuilder, NodeIdMap},
};
use serde::{Deserialize, Serialize};

/// Genome metadata that is fixed for the length of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetaGenome {
    pub inputs: usize,
    pub outputs: usize,
    /// whether genomes must stay free of cycles
    pub acyclic: bool,
    /// connection weights are kept within [-weight_scale, weight_scale]
    pub weight_scale: f64,
}

impl MetaGenome {
    pub fn new(inputs: usize, outputs: usize, acyclic: bool) -> Self {
        Self {
            inputs,
            outputs,
            acyclic,
            weight_scale: ESPEON_CONNECTION_WEIGHT_SCALE,
        }
    }

    pub fn with_weight_scale(self, weight_scale: f64) -> Self {
        Self {
            weight_scale,
            ..self
        }
    }

    /// Check that genomes can be built and mutated under this metadata
    pub fn validate(&self) -> GenomeResult<()> {
        if !(self.weight_scale.is_finite() && self.weight_scale >= 0.) {
            return Err(GenomeError::WeightScale(self.weight_scale));
        }

        if self.inputs.checked_add(self.outputs).is_none() {
            return Err(GenomeError::NodeCount {
                inputs: self.inputs,
                outputs: self.outputs,
            });
        }

        Ok(())
    }

    /// Number of input and output nodes, which hold ids `0..fixed()`
    #[inline]
    pub fn fixed(&self) -> usize {
        self.inputs + self.outputs
    }

    #[inline]
    pub fn is_input(&self, id: usize) -> bool {
        id < self.inputs
    }

    #[inline]
    pub fn is_output(&self, id: usize) -> bool {
        (self.inputs..self.fixed()).contains(&id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Sensory,
    Action,
    Internal,
}

/// An immutable genome: a sorted set of connection genes, along with the hidden nodes they
/// reference and the compiled [DirectedGraph] over them.
///
/// Mutation and crossover never edit a genome in place, they build a new one.
#[derive(Debug, Clone)]
pub struct Genome {
    meta: MetaGenome,
    id: usize,
    birth_generation: usize,
    genes: ConnectionGenes,
    /// sorted ids of every node referenced by `genes` that isn't an input or output
    hidden: Vec<usize>,
    node_map: NodeIdMap,
    digraph: DirectedGraph,
}

impl Genome {
    /// A genome over `genes`, deriving its hidden nodes from them
    pub fn new(meta: MetaGenome, id: usize, birth_generation: usize, genes: ConnectionGenes) -> Self {
        let hidden = DirectedGraphBuilder::hidden_node_ids(genes.conns(), meta.fixed());
        Self::with_hidden(meta, id, birth_generation, genes, hidden)
    }

    /// Like [Genome::new], but checks every invariant instead of trusting the caller
    pub fn try_new(
        meta: MetaGenome,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
    ) -> GenomeResult<Self> {
        meta.validate()?;
        genes.validate()?;
        let hidden = DirectedGraphBuilder::hidden_node_ids(genes.conns(), meta.fixed());
        let genome = Self::assemble(meta, id, birth_generation, genes, hidden);
        genome.validate()?;
        Ok(genome)
    }

    /// A genome over `genes` whose sorted hidden node ids are already known, which saves
    /// rescanning every connection when a mutation only adds or drops a node
    pub(crate) fn with_hidden(
        meta: MetaGenome,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
        hidden: Vec<usize>,
    ) -> Self {
        let genome = Self::assemble(meta, id, birth_generation, genes, hidden);
        #[cfg(debug_assertions)]
        if let Err(e) = genome.validate() {
            panic!("genome {id} failed validation: {e}");
        }
        genome
    }

    fn assemble(
        meta: MetaGenome,
        id: usize,
        birth_generation: usize,
        genes: ConnectionGenes,
        hidden: Vec<usize>,
    ) -> Self {
        let (digraph, node_map) = DirectedGraphBuilder::build_with_hidden(
            genes.conns(),
            meta.inputs,
            meta.outputs,
            &hidden,
        );

        Self {
            meta,
            id,
            birth_generation,
            genes,
            hidden,
            node_map,
            digraph,
        }
    }

    /// A child with this genome's topology and a rewritten set of weights
    pub(crate) fn reweighted(
        &self,
        id: usize,
        birth_generation: usize,
        rewrite: impl FnOnce(&mut [f64]),
    ) -> Self {
        let mut child = Self {
            id,
            birth_generation,
            ..self.clone()
        };
        rewrite(child.genes.weights_mut());
        child
    }

    #[inline]
    pub fn meta(&self) -> &MetaGenome {
        &self.meta
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn birth_generation(&self) -> usize {
        self.birth_generation
    }

    #[inline]
    pub fn genes(&self) -> &ConnectionGenes {
        &self.genes
    }

    #[inline]
    pub fn hidden_nodes(&self) -> &[usize] {
        &self.hidden
    }

    #[inline]
    pub fn node_map(&self) -> &NodeIdMap {
        &self.node_map
    }

    #[inline]
    pub fn digraph(&self) -> &DirectedGraph {
        &self.digraph
    }

    /// Connection count
    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total node count, including inputs and outputs that no connection touches
    #[inline]
    pub fn node_count(&self) -> usize {
        self.meta.fixed() + self.hidden.len()
    }

    /// The kind of node `id`, or None if this genome doesn't hold it
    pub fn node_kind(&self, id: usize) -> Option<NodeKind> {
        if self.meta.is_input(id) {
            Some(NodeKind::Sensory)
        } else if self.meta.is_output(id) {
            Some(NodeKind::Action)
        } else if self.contains_hidden(id) {
            Some(NodeKind::Internal)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains_hidden(&self, id: usize) -> bool {
        self.hidden.binary_search(&id).is_ok()
    }

    #[inline]
    pub fn contains_inno(&self, inno: usize) -> bool {
        self.genes.contains_inno(inno)
    }

    /// Node id of the `idx`th node, counting inputs, then outputs, then hidden nodes
    #[inline]
    pub(crate) fn node_id(&self, idx: usize) -> usize {
        if idx < self.meta.fixed() {
            idx
        } else {
            self.hidden[idx - self.meta.fixed()]
        }
    }

    /// Weights in the order of [Genome::digraph]'s connections.
    ///
    /// Hidden node ids are packed into indices in ascending order, so remapping never reorders
    /// connections, and the digraph's connection order is the genes' endpoint order.
    #[inline]
    pub fn digraph_weights(&self) -> &[f64] {
        self.genes.weights()
    }

    /// Check every invariant a genome relies on
    pub fn validate(&self) -> GenomeResult<()> {
        self.meta.validate()?;
        self.genes.validate()?;

        let fixed = self.meta.fixed();
        if let Some(&id) = self.hidden.iter().find(|&&id| id < fixed) {
            return Err(GenomeError::HiddenInFixedRange(id));
        }

        if DirectedGraphBuilder::hidden_node_ids(self.genes.conns(), fixed) != self.hidden {
            return Err(GenomeError::HiddenNodes);
        }

        for gene in self.genes.iter() {
            if self.meta.is_input(gene.conn.target) {
                return Err(GenomeError::InputTarget(gene.conn));
            }

            for id in [gene.conn.source, gene.conn.target] {
                if self.node_kind(id).is_none() {
                    return Err(GenomeError::UnknownNode(id));
                }
            }

            if !gene.weight.is_finite() {
                return Err(GenomeError::NonFiniteWeight {
                    connection: gene.conn,
                    weight: gene.weight,
                });
            }
        }

        let matches_digraph = self.digraph.connection_count() == self.genes.len()
            && self.digraph.total_node_count() == self.node_count()
            && self.genes.conns().iter().enumerate().all(|(idx, c)| {
                c.mapped(&self.node_map)
                    == Some(DirectedConnection::new(
                        self.digraph.source(idx),
                        self.digraph.target(idx),
                    ))
            });
        if !matches_digraph {
            return Err(GenomeError::Digraph);
        }

        if self.meta.acyclic && CyclicGraphCheck::new().is_cyclic(&self.digraph) {
            return Err(GenomeError::Cyclic);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn genes(spec: &[(usize, usize, f64, usize)]) -> ConnectionGenes {
        ConnectionGenes::from_genes(
            spec.iter()
                .map(|&(s, t, w, inno)| ConnectionGene::new(s, t, w, inno))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_derives_hidden() {
        let meta = MetaGenome::new(2, 1, true);
        let genome = Genome::new(
            meta,
            0,
            0,
            genes(&[(0, 9, 1., 0), (9, 2, 1., 1), (1, 4, 1., 2), (4, 2, 1., 3)]),
        );
        assert_eq!(genome.hidden_nodes(), &[4, 9]);
        assert_eq!(genome.node_count(), 5);
        assert_eq!(genome.node_map().map(9), Some(4));
        assert_eq!(genome.digraph().connection_count(), 4);
        assert_eq!(genome.node_kind(0), Some(NodeKind::Sensory));
        assert_eq!(genome.node_kind(2), Some(NodeKind::Action));
        assert_eq!(genome.node_kind(9), Some(NodeKind::Internal));
        assert_eq!(genome.node_kind(5), None);
        assert_eq!(genome.node_id(3), 4);
        assert_eq!(genome.node_id(1), 1);
    }

    #[test]
    fn test_digraph_weights_in_digraph_order() {
        let genome = Genome::new(
            MetaGenome::new(1, 1, false),
            0,
            0,
            genes(&[(0, 50, 0.5, 0), (50, 3, 0.25, 1), (3, 1, 0.125, 2)]),
        );
        let map = genome.node_map();
        for (idx, gene) in genome.genes().iter().enumerate() {
            assert_eq!(gene.conn.mapped(map).map(|c| c.source), Some(genome.digraph().source(idx)));
            assert_eq!(genome.digraph_weights()[idx], gene.weight);
        }
    }

    #[test]
    fn test_try_new_rejects_input_target() {
        let result = Genome::try_new(MetaGenome::new(2, 1, false), 0, 0, genes(&[(2, 0, 1., 0)]));
        assert_eq!(
            result.map(|_| ()),
            Err(GenomeError::InputTarget(DirectedConnection::new(2, 0)))
        );
    }

    #[test]
    fn test_try_new_rejects_cycle() {
        let cyclic = genes(&[(0, 3, 1., 0), (3, 4, 1., 1), (4, 3, 1., 2), (4, 1, 1., 3)]);
        assert_eq!(
            Genome::try_new(MetaGenome::new(1, 1, true), 0, 0, cyclic.clone()).map(|_| ()),
            Err(GenomeError::Cyclic)
        );
        assert!(Genome::try_new(MetaGenome::new(1, 1, false), 0, 0, cyclic).is_ok());
    }

    #[test]
    fn test_try_new_rejects_non_finite() {
        assert!(matches!(
            Genome::try_new(MetaGenome::new(1, 1, false), 0, 0, genes(&[(0, 1, f64::NAN, 0)])),
            Err(GenomeError::NonFiniteWeight { .. })
        ));
    }

    #[test]
    fn test_meta_validate() {
        assert!(MetaGenome::new(2, 1, true).validate().is_ok());
        assert!(MetaGenome::new(2, 1, true)
            .with_weight_scale(0.)
            .validate()
            .is_ok());
        for scale in [-1., f64::NAN, f64::INFINITY] {
            assert!(matches!(
                MetaGenome::new(2, 1, true).with_weight_scale(scale).validate(),
                Err(GenomeError::WeightScale(_))
            ));
        }
        assert_eq!(
            MetaGenome::new(usize::MAX, 1, false).validate(),
            Err(GenomeError::NodeCount {
                inputs: usize::MAX,
                outputs: 1
            })
        );
    }

    #[test]
    fn test_try_new_rejects_bad_meta() {
        let meta = MetaGenome::new(1, 1, false).with_weight_scale(-1.);
        assert_eq!(
            Genome::try_new(meta, 0, 0, genes(&[(0, 1, 0.5, 0)])).map(|_| ()),
            Err(GenomeError::WeightScale(-1.))
        );
    }

    #[test]
    fn test_validate_hidden_mismatch() {
        let mut genome = Genome::new(
            MetaGenome::new(1, 1, true),
            0,
            0,
            genes(&[(0, 5, 1., 0), (5, 1, 1., 1)]),
        );
        genome.hidden.push(6);
        assert_eq!(genome.validate(), Err(GenomeError::HiddenNodes));

        genome.hidden = vec![1, 5];
        assert_eq!(genome.validate(), Err(GenomeError::HiddenInFixedRange(1)));
    }

    #[test]
    fn test_reweighted() {
        let parent = Genome::new(
            MetaGenome::new(1, 1, true),
            3,
            0,
            genes(&[(0, 1, 1., 0)]),
        );
        let child = parent.reweighted(4, 1, |w| w[0] = -1.);
        assert_eq!(child.id(), 4);
        assert_eq!(child.birth_generation(), 1);
        assert_eq!(child.genes().weights(), &[-1.]);
        assert_eq!(parent.genes().weights(), &[1.]);
        assert!(child.validate().is_ok());
    }

    #[test]
    fn test_empty_genome() {
        let genome = Genome::new(MetaGenome::new(3, 2, true), 0, 0, ConnectionGenes::new());
        assert!(genome.is_empty());
        assert_eq!(genome.node_count(), 5);
        assert!(genome.validate().is_ok());
    }
}
