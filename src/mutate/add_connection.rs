use super::Strategy;
use crate::{
    constants::{ESPEON_ADD_CONNECTION_ATTEMPTS, ESPEON_SMALL_WEIGHT_FACTOR},
    genome::{ConnectionGene, Genome},
    graph::{CyclicConnectionCheck, DirectedConnection},
    innovation::InnoGen,
    random::{EvolutionEvent, Happens},
};
use rand::Rng;
use tracing::debug;

/// Weight for a new connection: usually small, otherwise anywhere in the weight range
fn new_weight(scale: f64, rng: &mut impl Happens) -> f64 {
    let scale = if rng.happens(EvolutionEvent::SmallWeight) {
        scale * ESPEON_SMALL_WEIGHT_FACTOR
    } else {
        scale
    };
    rng.random_range(-scale..=scale)
}

/// A child of `parent` with `conn` added at position `idx`
fn with_connection(
    parent: &Genome,
    conn: DirectedConnection,
    idx: usize,
    inno: &mut InnoGen,
    rng: &mut impl Happens,
) -> Genome {
    let gene = ConnectionGene {
        conn,
        weight: new_weight(parent.meta().weight_scale, rng),
        inno: inno.path(conn, parent),
    };
    debug_assert_eq!(parent.genes().search(&conn), Err(idx));

    // a new connection only joins nodes the parent already has
    let mut genes = parent.genes().clone();
    genes.insert(gene);
    Genome::with_hidden(
        *parent.meta(),
        inno.genome_ids.next(),
        inno.generation.peek(),
        genes,
        parent.hidden_nodes().to_vec(),
    )
}

/// Adds a connection that keeps the genome acyclic. Sources are inputs or hidden nodes, targets
/// are hidden or output nodes.
#[derive(Debug, Clone)]
pub struct AddAcyclicConnection {
    check: CyclicConnectionCheck,
    pub attempts: usize,
}

impl Default for AddAcyclicConnection {
    fn default() -> Self {
        Self {
            check: CyclicConnectionCheck::new(),
            attempts: ESPEON_ADD_CONNECTION_ATTEMPTS,
        }
    }
}

impl AddAcyclicConnection {
    /// The position `conn` would be inserted at in `parent`, or None if adding it is illegal:
    /// an output source, an input target, a node `parent` doesn't hold, a connection it already
    /// has, or one that would close a cycle
    pub fn check_candidate(&mut self, parent: &Genome, conn: &DirectedConnection) -> Option<usize> {
        let meta = parent.meta();
        if meta.is_output(conn.source) || meta.is_input(conn.target) {
            return None;
        }

        let mapped = conn.mapped(parent.node_map())?;
        let idx = parent.genes().search(conn).err()?;
        (!self.check.is_connection_cyclic(parent.digraph(), &mapped)).then_some(idx)
    }

    fn sample(parent: &Genome, rng: &mut impl Rng) -> DirectedConnection {
        let meta = parent.meta();
        let hidden = parent.hidden_nodes();

        let src = rng.random_range(0..meta.inputs + hidden.len());
        let source = if src < meta.inputs {
            src
        } else {
            hidden[src - meta.inputs]
        };

        let tgt = rng.random_range(0..meta.outputs + hidden.len());
        let target = if tgt < meta.outputs {
            meta.inputs + tgt
        } else {
            hidden[tgt - meta.outputs]
        };

        DirectedConnection::new(source, target)
    }
}

impl Strategy for AddAcyclicConnection {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        let meta = parent.meta();
        let hidden = parent.hidden_nodes().len();
        if meta.inputs + hidden == 0 || meta.outputs + hidden == 0 {
            return None;
        }

        for _ in 0..self.attempts {
            let conn = Self::sample(parent, rng);
            if let Some(idx) = self.check_candidate(parent, &conn) {
                return Some(with_connection(parent, conn, idx, inno, rng));
            }
        }

        debug!(
            parent = parent.id(),
            attempts = self.attempts,
            "no acyclic connection found"
        );
        None
    }
}

/// Adds any connection that doesn't target an input, including self loops
#[derive(Debug, Clone)]
pub struct AddCyclicConnection {
    pub attempts: usize,
}

impl Default for AddCyclicConnection {
    fn default() -> Self {
        Self {
            attempts: ESPEON_ADD_CONNECTION_ATTEMPTS,
        }
    }
}

impl AddCyclicConnection {
    /// The position `conn` would be inserted at in `parent`, or None if it targets an input,
    /// touches a node `parent` doesn't hold, or is already present
    pub fn check_candidate(parent: &Genome, conn: &DirectedConnection) -> Option<usize> {
        if parent.meta().is_input(conn.target) {
            return None;
        }

        conn.mapped(parent.node_map())?;
        parent.genes().search(conn).err()
    }

    fn sample(parent: &Genome, rng: &mut impl Rng) -> DirectedConnection {
        let meta = parent.meta();
        let source = parent.node_id(rng.random_range(0..parent.node_count()));
        let target =
            parent.node_id(meta.inputs + rng.random_range(0..parent.node_count() - meta.inputs));
        DirectedConnection::new(source, target)
    }
}

impl Strategy for AddCyclicConnection {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        if parent.node_count() == parent.meta().inputs {
            return None;
        }

        for _ in 0..self.attempts {
            let conn = Self::sample(parent, rng);
            if let Some(idx) = Self::check_candidate(parent, &conn) {
                return Some(with_connection(parent, conn, idx, inno, rng));
            }
        }

        debug!(
            parent = parent.id(),
            attempts = self.attempts,
            "no cyclic connection found"
        );
        None
    }
}
