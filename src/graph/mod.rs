//! Dense-index directed graphs compiled from a genome's sorted connection list, plus the
//! algorithms that run over them. Node *IDs* are the sparse, historical identifiers a genome
//! carries; node *indices* are the dense `0..N` space these graphs use.

pub mod bitmap;
pub mod builder;
pub mod connection_check;
pub mod cyclic;
pub mod depth;
pub mod node_map;
pub mod pool;

pub use builder::DirectedGraphBuilder;
pub use connection_check::CyclicConnectionCheck;
pub use cyclic::CyclicGraphCheck;
pub use depth::{AcyclicDepth, GraphDepth};
pub use node_map::NodeIdMap;

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A directed edge between two nodes. Ordering is lexicographic on (source, target), which is the
/// canonical sort order of a genome's connection genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectedConnection {
    pub source: usize,
    pub target: usize,
}

impl DirectedConnection {
    #[inline]
    pub const fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }

    /// This connection with both endpoints mapped from node ID to node index space.
    /// None if either endpoint is unknown to `map`.
    #[inline]
    pub fn mapped(&self, map: &NodeIdMap) -> Option<Self> {
        Some(Self::new(map.map(self.source)?, map.map(self.target)?))
    }
}

impl From<(usize, usize)> for DirectedConnection {
    fn from((source, target): (usize, usize)) -> Self {
        Self::new(source, target)
    }
}

/// A read-only directed graph over node indices `0..total_node_count`, where the first
/// `input_count` indices are inputs and the following `output_count` are outputs.
///
/// Connections are held as parallel source/target arrays sorted by source then target.
#[derive(Debug, Clone)]
pub struct DirectedGraph {
    input_count: usize,
    output_count: usize,
    total_node_count: usize,
    sources: Vec<usize>,
    targets: Vec<usize>,
    /// first connection index for each source node, compiled on first use
    first_by_source: OnceLock<Vec<Option<usize>>>,
}

impl DirectedGraph {
    pub(crate) fn new(
        input_count: usize,
        output_count: usize,
        total_node_count: usize,
        sources: Vec<usize>,
        targets: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(sources.len(), targets.len());
        debug_assert!(total_node_count >= input_count + output_count);
        debug_assert!(
            sources
                .iter()
                .zip(&targets)
                .zip(sources.iter().zip(&targets).skip(1))
                .all(|(l, r)| l < r),
            "digraph connections must be sorted and unique"
        );

        Self {
            input_count,
            output_count,
            total_node_count,
            sources,
            targets,
            first_by_source: OnceLock::new(),
        }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    #[inline]
    pub fn total_node_count(&self) -> usize {
        self.total_node_count
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    #[inline]
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    #[inline]
    pub fn source(&self, conn_idx: usize) -> usize {
        self.sources[conn_idx]
    }

    #[inline]
    pub fn target(&self, conn_idx: usize) -> usize {
        self.targets[conn_idx]
    }

    /// Index of the first connection whose source is `node`, if it has any outgoing connections
    pub fn first_connection(&self, node: usize) -> Option<usize> {
        self.first_by_source
            .get_or_init(|| self.compile_first_by_source())
            .get(node)
            .copied()
            .flatten()
    }

    /// Target indices of every outgoing connection of `node`
    pub fn targets_of(&self, node: usize) -> &[usize] {
        let Some(start) = self.first_connection(node) else {
            return &[];
        };

        let end = start
            + self.sources[start..]
                .iter()
                .take_while(|&&s| s == node)
                .count();
        &self.targets[start..end]
    }

    fn compile_first_by_source(&self) -> Vec<Option<usize>> {
        let mut first = vec![None; self.total_node_count];
        let mut prev = None;
        for (idx, &src) in self.sources.iter().enumerate() {
            if prev != Some(src) {
                first[src] = Some(idx);
                prev = Some(src);
            }
        }
        first
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn graph() -> DirectedGraph {
        // 0 -> 2, 0 -> 3, 1 -> 3, 3 -> 2
        DirectedGraph::new(2, 1, 4, vec![0, 0, 1, 3], vec![2, 3, 3, 2])
    }

    #[test]
    fn test_connection_order() {
        let mut conns = vec![
            DirectedConnection::new(1, 0),
            DirectedConnection::new(0, 5),
            DirectedConnection::new(0, 2),
        ];
        conns.sort();
        assert_eq!(
            conns,
            vec![
                DirectedConnection::new(0, 2),
                DirectedConnection::new(0, 5),
                DirectedConnection::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_first_connection() {
        let g = graph();
        assert_eq!(g.first_connection(0), Some(0));
        assert_eq!(g.first_connection(1), Some(2));
        assert_eq!(g.first_connection(2), None);
        assert_eq!(g.first_connection(3), Some(3));
        assert_eq!(g.first_connection(100), None);
    }

    #[test]
    fn test_targets_of() {
        let g = graph();
        assert_eq!(g.targets_of(0), &[2, 3]);
        assert_eq!(g.targets_of(1), &[3]);
        assert!(g.targets_of(2).is_empty());
        assert_eq!(g.targets_of(3), &[2]);
    }

    #[test]
    fn test_empty_graph() {
        let g = DirectedGraph::new(3, 2, 5, vec![], vec![]);
        assert_eq!(g.connection_count(), 0);
        for n in 0..5 {
            assert_eq!(g.first_connection(n), None);
        }
    }
}
