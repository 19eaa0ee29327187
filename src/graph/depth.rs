use super::{pool::PooledIndices, DirectedGraph};

/// Depth of every node in an acyclic graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphDepth {
    /// longest path from any input to each node, zero for nodes no input reaches
    pub node_depths: Vec<usize>,
    /// the largest entry of `node_depths`
    pub max_depth: usize,
}

pub struct AcyclicDepth;

impl AcyclicDepth {
    /// Node depths of `graph`, or None if it contains a cycle
    pub fn of(graph: &DirectedGraph) -> Option<GraphDepth> {
        let n = graph.total_node_count();
        let mut in_degree = PooledIndices::filled(n, 0);
        for &t in graph.targets() {
            in_degree[t] += 1;
        }

        let mut reached = vec![false; n];
        reached[..graph.input_count()].fill(true);

        let mut node_depths = vec![0; n];
        let mut queue = PooledIndices::with_capacity(n);
        queue.extend((0..n).filter(|&node| in_degree[node] == 0));

        let mut head = 0;
        while let Some(&node) = queue.get(head) {
            head += 1;
            for &t in graph.targets_of(node) {
                if reached[node] {
                    reached[t] = true;
                    node_depths[t] = node_depths[t].max(node_depths[node] + 1);
                }

                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    queue.push(t);
                }
            }
        }

        // every node is dequeued exactly once unless some of them sit on a cycle
        (head == n).then(|| GraphDepth {
            max_depth: node_depths.iter().copied().max().unwrap_or(0),
            node_depths,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{DirectedConnection, DirectedGraphBuilder};

    fn graph(inputs: usize, outputs: usize, pairs: &[(usize, usize)]) -> DirectedGraph {
        let mut conns = pairs
            .iter()
            .copied()
            .map(DirectedConnection::from)
            .collect::<Vec<_>>();
        conns.sort();
        DirectedGraphBuilder::build(&conns, inputs, outputs).0
    }

    #[test]
    fn test_direct() {
        let d = AcyclicDepth::of(&graph(2, 1, &[(0, 2), (1, 2)])).unwrap();
        assert_eq!(d.node_depths, vec![0, 0, 1]);
        assert_eq!(d.max_depth, 1);
    }

    #[test]
    fn test_longest_path_wins() {
        // 0 -> 1 directly, and 0 -> 2 -> 3 -> 1
        let d = AcyclicDepth::of(&graph(1, 1, &[(0, 1), (0, 2), (2, 3), (3, 1)])).unwrap();
        assert_eq!(d.node_depths, vec![0, 3, 1, 2]);
        assert_eq!(d.max_depth, 3);
    }

    #[test]
    fn test_unreached_nodes_stay_shallow() {
        // hidden 5 feeds the output but nothing feeds 5
        let d = AcyclicDepth::of(&graph(1, 1, &[(0, 1), (5, 1)])).unwrap();
        assert_eq!(d.node_depths, vec![0, 1, 0]);
    }

    #[test]
    fn test_cyclic() {
        assert_eq!(AcyclicDepth::of(&graph(1, 1, &[(0, 2), (2, 3), (3, 2)])), None);
    }

    #[test]
    fn test_empty() {
        let d = AcyclicDepth::of(&graph(3, 2, &[])).unwrap();
        assert_eq!(d.node_depths, vec![0; 5]);
        assert_eq!(d.max_depth, 0);
    }
}
