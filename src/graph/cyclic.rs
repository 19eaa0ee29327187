use super::{bitmap::Bitmap, DirectedGraph};
use crate::constants::ESPEON_BITMAP_INITIAL_CAPACITY;

/// Whole-graph cycle detection, for validation and tests.
///
/// Every node not reached by an earlier traversal is used as a fresh root, so cycles in parts of
/// the graph unreachable from the inputs are still found. A node is visited at most once across
/// all traversals. Working state is reused between calls; taking `&mut self` keeps one instance
/// from ever being entered twice at once.
#[derive(Debug, Clone)]
pub struct CyclicGraphCheck {
    ancestors: Bitmap,
    visited: Bitmap,
}

impl Default for CyclicGraphCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl CyclicGraphCheck {
    pub fn new() -> Self {
        Self {
            ancestors: Bitmap::new(ESPEON_BITMAP_INITIAL_CAPACITY),
            visited: Bitmap::new(ESPEON_BITMAP_INITIAL_CAPACITY),
        }
    }

    /// Whether `graph` contains at least one cycle
    pub fn is_cyclic(&mut self, graph: &DirectedGraph) -> bool {
        self.ancestors.ensure_capacity(graph.total_node_count());
        self.visited.ensure_capacity(graph.total_node_count());

        let cyclic = (0..graph.total_node_count())
            .any(|node| !self.visited.get(node) && self.traverse(graph, node));

        self.ancestors.clear();
        self.visited.clear();
        cyclic
    }

    fn traverse(&mut self, graph: &DirectedGraph, node: usize) -> bool {
        if self.ancestors.get(node) {
            return true;
        }

        if self.visited.get(node) {
            return false;
        }

        self.visited.set(node);
        if graph.targets_of(node).is_empty() {
            return false;
        }

        self.ancestors.set(node);
        for &target in graph.targets_of(node) {
            if self.traverse(graph, target) {
                return true;
            }
        }
        self.ancestors.unset(node);

        false
    }
}
