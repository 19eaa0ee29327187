use super::{bitmap::Bitmap, DirectedConnection, DirectedGraph};
use crate::constants::ESPEON_BITMAP_INITIAL_CAPACITY;

/// Decides whether adding one connection to an acyclic graph would close a cycle.
///
/// Walks forward from the new connection's target looking for its source. The walk keeps an
/// explicit stack of connection indices rather than recursing: the top of the stack is the
/// connection currently being followed, and advancing it to the next sibling with the same source
/// is how a node's remaining outgoing connections get iterated.
#[derive(Debug, Clone)]
pub struct CyclicConnectionCheck {
    stack: Vec<usize>,
    visited: Bitmap,
}

impl Default for CyclicConnectionCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl CyclicConnectionCheck {
    pub fn new() -> Self {
        Self {
            stack: Vec::with_capacity(16),
            visited: Bitmap::new(ESPEON_BITMAP_INITIAL_CAPACITY),
        }
    }

    /// Whether adding `conn`, given in node index space, to `graph` would form a cycle.
    /// `graph` itself must be acyclic.
    pub fn is_connection_cyclic(&mut self, graph: &DirectedGraph, conn: &DirectedConnection) -> bool {
        self.visited.ensure_capacity(graph.total_node_count());
        let cyclic = self.search(graph, conn);
        self.stack.clear();
        self.visited.clear();
        cyclic
    }

    fn search(&mut self, graph: &DirectedGraph, conn: &DirectedConnection) -> bool {
        if conn.source == conn.target {
            return true;
        }

        let Some(first) = graph.first_connection(conn.target) else {
            return false;
        };

        self.stack.push(first);
        self.visited.set(conn.target);

        while let Some(&current) = self.stack.last() {
            self.advance(graph, current);

            let child = graph.target(current);
            if self.visited.get(child) {
                continue;
            }

            if child == conn.source {
                return true;
            }

            self.visited.set(child);
            if let Some(grandchild) = graph.first_connection(child) {
                self.stack.push(grandchild);
            }
        }

        false
    }

    /// Point the top of the stack at the next unvisited sibling of `current`, or pop it if
    /// `current` was its source's last one
    fn advance(&mut self, graph: &DirectedGraph, current: usize) {
        let source = graph.source(current);
        let next = (current + 1..graph.connection_count())
            .take_while(|&idx| graph.source(idx) == source)
            .find(|&idx| !self.visited.get(graph.target(idx)));

        match (next, self.stack.last_mut()) {
            (Some(next), Some(top)) => *top = next,
            _ => {
                self.stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::DirectedGraphBuilder;

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
    fn test_self_loop_cyclic() {
        let g = graph(1, 1, &[(0, 1)]);
        let mut check = CyclicConnectionCheck::new();
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(1, 1)));
    }

    #[test]
    fn test_target_without_outgoing() {
        let g = graph(2, 1, &[(0, 2), (1, 2)]);
        let mut check = CyclicConnectionCheck::new();
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(0, 2)));
    }

    #[test]
    fn test_back_edge() {
        // indices: 0 input, 1 output, 2..=4 hidden in a chain 0 -> 2 -> 3 -> 4 -> 1
        let g = graph(1, 1, &[(0, 2), (2, 3), (3, 4), (4, 1)]);
        let mut check = CyclicConnectionCheck::new();
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(4, 2)));
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(3, 2)));
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(2, 4)));
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(0, 4)));
    }

    #[test]
    fn test_branching_search() {
        // 2 fans out to 3, 4, 5; only 5 leads on to 6
        let g = graph(
            1,
            1,
            &[(0, 2), (2, 3), (2, 4), (2, 5), (3, 1), (4, 1), (5, 6), (6, 1)],
        );
        let mut check = CyclicConnectionCheck::new();
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(6, 2)));
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(6, 5)));
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(6, 3)));
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(4, 3)));
    }

    #[test]
    fn test_diamond_revisit() {
        // both 3 and 4 lead to 5, which must only be explored once
        let g = graph(1, 1, &[(0, 2), (2, 3), (2, 4), (3, 5), (4, 5), (5, 1)]);
        let mut check = CyclicConnectionCheck::new();
        assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(5, 2)));
        assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(4, 3)));
    }

    #[test]
    fn test_state_reset_between_calls() {
        let g = graph(1, 1, &[(0, 2), (2, 3), (3, 1)]);
        let mut check = CyclicConnectionCheck::new();
        for _ in 0..5 {
            assert!(check.is_connection_cyclic(&g, &DirectedConnection::new(3, 2)));
            assert!(!check.is_connection_cyclic(&g, &DirectedConnection::new(0, 3)));
        }
    }

    #[test]
    fn test_agrees_with_whole_graph_check() {
        use crate::graph::CyclicGraphCheck;
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut whole = CyclicGraphCheck::new();
        let mut single = CyclicConnectionCheck::new();

        const NODES: usize = 12;
        let raw = |conns: &[DirectedConnection]| {
            DirectedGraph::new(
                1,
                1,
                NODES,
                conns.iter().map(|c| c.source).collect(),
                conns.iter().map(|c| c.target).collect(),
            )
        };

        for _ in 0..200 {
            // edges only run from lower to higher indices, so this is always a dag
            let mut conns = vec![];
            for s in 0..NODES {
                for t in (s + 1)..NODES {
                    if rng.random_bool(0.2) {
                        conns.push(DirectedConnection::new(s, t));
                    }
                }
            }
            let g = raw(&conns);
            assert!(!whole.is_cyclic(&g));

            let candidate =
                DirectedConnection::new(rng.random_range(0..NODES), rng.random_range(0..NODES));

            let mut with = conns.clone();
            if !with.contains(&candidate) {
                with.push(candidate);
            }
            with.sort();
            let expanded = raw(&with);

            assert_eq!(
                single.is_connection_cyclic(&g, &candidate),
                whole.is_cyclic(&expanded),
                "{candidate:?} over {conns:?}"
            );
        }
    }
}
