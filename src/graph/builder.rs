use super::{DirectedConnection, DirectedGraph, NodeIdMap};

/// Compiles a sorted connection list over node IDs into a [DirectedGraph] over node indices.
///
/// Inputs and outputs keep their IDs as indices; hidden node IDs are sorted and packed in after
/// them. Because that mapping is monotonic, connections remapped from a list sorted by
/// (source ID, target ID) are still sorted by (source index, target index).
pub struct DirectedGraphBuilder;

impl DirectedGraphBuilder {
    /// Every node ID referenced by `connections` that isn't an input or output, sorted and unique
    pub fn hidden_node_ids(connections: &[DirectedConnection], fixed: usize) -> Vec<usize> {
        let mut hidden = connections
            .iter()
            .flat_map(|c| [c.source, c.target])
            .filter(|&id| id >= fixed)
            .collect::<Vec<_>>();
        hidden.sort_unstable();
        hidden.dedup();
        hidden
    }

    /// Compile `connections`, which must be sorted and free of duplicates
    pub fn build(
        connections: &[DirectedConnection],
        input_count: usize,
        output_count: usize,
    ) -> (DirectedGraph, NodeIdMap) {
        let hidden = Self::hidden_node_ids(connections, input_count + output_count);
        Self::build_with_hidden(connections, input_count, output_count, &hidden)
    }

    /// Compile `connections` where the sorted hidden node IDs are already known
    pub fn build_with_hidden(
        connections: &[DirectedConnection],
        input_count: usize,
        output_count: usize,
        hidden: &[usize],
    ) -> (DirectedGraph, NodeIdMap) {
        debug_assert!(hidden.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(connections.windows(2).all(|w| w[0] < w[1]));

        let fixed = input_count + output_count;
        let map = NodeIdMap::new(fixed, hidden);

        let mut sources = Vec::with_capacity(connections.len());
        let mut targets = Vec::with_capacity(connections.len());
        for c in connections {
            // the hidden set must cover every endpoint
            let (Some(s), Some(t)) = (map.map(c.source), map.map(c.target)) else {
                panic!("connection {c:?} references a node outside the hidden node set");
            };
            sources.push(s);
            targets.push(t);
        }

        (
            DirectedGraph::new(
                input_count,
                output_count,
                fixed + hidden.len(),
                sources,
                targets,
            ),
            map,
        )
    }
}
