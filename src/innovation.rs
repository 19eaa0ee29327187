//! Innovation bookkeeping for a single evolutionary run.
//!
//! The ledgers remember the ids handed out the first time a structural change was made, so that
//! the same change arising again in another lineage lands on the same ids. A remembered id is
//! only reused when the genome being mutated doesn't already hold it; a genome can pick up an id
//! through crossover from a lineage that used it for something else.

use crate::{genome::Genome, genome::MetaGenome, graph::DirectedConnection, sequence::IdSequence};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Innovation ids of connections added by mutation, keyed by their endpoints
#[derive(Debug, Clone, Default)]
pub struct AddedConnectionBuffer(FxHashMap<DirectedConnection, usize>);

impl AddedConnectionBuffer {
    #[inline]
    pub fn lookup(&self, conn: &DirectedConnection) -> Option<usize> {
        self.0.get(conn).copied()
    }

    /// Remember `inno` for `conn`, unless something is already remembered for it
    pub fn register(&mut self, conn: DirectedConnection, inno: usize) {
        self.0.entry(conn).or_insert(inno);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

/// Ids assigned when splitting a connection with a new node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedNode {
    pub node: usize,
    /// innovation id of source -> node
    pub incoming: usize,
    /// innovation id of node -> target
    pub outgoing: usize,
}

/// [AddedNode]s keyed by the innovation id of the connection that was split
#[derive(Debug, Clone, Default)]
pub struct AddedNodeBuffer(FxHashMap<usize, AddedNode>);

impl AddedNodeBuffer {
    #[inline]
    pub fn lookup(&self, split_inno: usize) -> Option<AddedNode> {
        self.0.get(&split_inno).copied()
    }

    pub fn register(&mut self, split_inno: usize, added: AddedNode) {
        self.0.entry(split_inno).or_insert(added);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

/// Id sequences and innovation ledgers shared by every genome in a run
#[derive(Debug, Clone)]
pub struct InnoGen {
    pub genome_ids: IdSequence,
    /// connection innovation ids
    pub innovations: IdSequence,
    /// hidden node ids, which start after the inputs and outputs
    pub node_ids: IdSequence,
    /// the generation new genomes are born into
    pub generation: IdSequence,
    pub connections: AddedConnectionBuffer,
    pub nodes: AddedNodeBuffer,
}

impl InnoGen {
    pub fn new(meta: &MetaGenome) -> Self {
        Self {
            genome_ids: IdSequence::default(),
            innovations: IdSequence::default(),
            node_ids: IdSequence::new(meta.fixed()),
            generation: IdSequence::default(),
            connections: AddedConnectionBuffer::default(),
            nodes: AddedNodeBuffer::default(),
        }
    }

    /// Pick a run back up from a saved population: every sequence continues past the ids `pop`
    /// holds, and the connection ledger remembers each connection `pop` carries.
    pub fn resumed(meta: &MetaGenome, pop: &[Genome]) -> Self {
        let mut inno = Self::new(meta);
        let after = |max: Option<usize>| max.map_or(0, |id| id + 1);

        inno.genome_ids.reset(after(pop.iter().map(Genome::id).max()));
        inno.innovations
            .reset(after(pop.iter().filter_map(|g| g.genes().max_inno()).max()));
        inno.node_ids.reset(
            after(pop.iter().filter_map(|g| g.hidden_nodes().last().copied()).max())
                .max(meta.fixed()),
        );
        inno.generation
            .reset(pop.iter().map(Genome::birth_generation).max().unwrap_or(0));

        for genome in pop {
            for gene in genome.genes().iter() {
                inno.connections.register(gene.conn, gene.inno);
            }
        }
        inno
    }

    /// Innovation id for a new connection `conn` in `genome`
    pub fn path(&mut self, conn: DirectedConnection, genome: &Genome) -> usize {
        match self.connections.lookup(&conn) {
            Some(inno) if !genome.contains_inno(inno) => {
                trace!(?conn, inno, "connection ledger hit");
                inno
            }
            Some(taken) => {
                let inno = self.innovations.next();
                trace!(?conn, taken, inno, "connection ledger id already in genome");
                inno
            }
            None => {
                let inno = self.innovations.next();
                self.connections.register(conn, inno);
                trace!(?conn, inno, "connection ledger miss");
                inno
            }
        }
    }

    /// Ids for splitting the connection with innovation id `split_inno` in `genome`
    pub fn split(&mut self, split_inno: usize, genome: &Genome) -> AddedNode {
        match self.nodes.lookup(split_inno) {
            Some(added)
                if !genome.contains_hidden(added.node)
                    && !genome.contains_inno(added.incoming)
                    && !genome.contains_inno(added.outgoing) =>
            {
                trace!(split_inno, ?added, "node ledger hit");
                added
            }
            Some(taken) => {
                let added = self.fresh_node();
                trace!(split_inno, ?taken, ?added, "node ledger ids already in genome");
                added
            }
            None => {
                let added = self.fresh_node();
                self.nodes.register(split_inno, added);
                trace!(split_inno, ?added, "node ledger miss");
                added
            }
        }
    }

    fn fresh_node(&mut self) -> AddedNode {
        AddedNode {
            node: self.node_ids.next(),
            incoming: self.innovations.next(),
            outgoing: self.innovations.next(),
        }
    }

    /// Move on to the next generation, returning it
    pub fn next_generation(&mut self) -> usize {
        self.generation.next();
        self.generation.peek()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::genome::{ConnectionGene, ConnectionGenes};

    fn genome(meta: MetaGenome, spec: &[(usize, usize, usize)]) -> Genome {
        Genome::new(
            meta,
            0,
            0,
            ConnectionGenes::from_genes(
                spec.iter()
                    .map(|&(s, t, i)| ConnectionGene::new(s, t, 1., i))
                    .collect(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_new_node_ids_after_fixed() {
        let mut inno = InnoGen::new(&MetaGenome::new(3, 2, true));
        assert_eq!(inno.node_ids.next(), 5);
        assert_eq!(inno.innovations.peek(), 0);
    }

    #[test]
    fn test_path_converges() {
        let meta = MetaGenome::new(2, 1, true);
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(10);

        let a = genome(meta, &[(0, 2, 0)]);
        let b = genome(meta, &[(0, 2, 3)]);
        let conn = DirectedConnection::new(1, 2);
        let first = inno.path(conn, &a);
        assert_eq!(first, 10);
        assert_eq!(inno.path(conn, &b), first);
        assert_eq!(inno.connections.len(), 1);
        assert_eq!(inno.innovations.peek(), 11);
    }

    #[test]
    fn test_path_collision_draws_fresh() {
        let meta = MetaGenome::new(2, 1, true);
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(10);
        let conn = DirectedConnection::new(1, 2);
        inno.connections.register(conn, 0);

        // genome already holds innovation 0 on another connection
        let g = genome(meta, &[(0, 2, 0)]);
        assert_eq!(inno.path(conn, &g), 10);
        assert_eq!(inno.connections.lookup(&conn), Some(0));
    }

    #[test]
    fn test_split_converges() {
        let meta = MetaGenome::new(2, 1, true);
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(7);

        let a = genome(meta, &[(0, 2, 5), (1, 2, 6)]);
        let b = genome(meta, &[(0, 2, 5)]);
        let first = inno.split(5, &a);
        assert_eq!(
            first,
            AddedNode {
                node: 3,
                incoming: 7,
                outgoing: 8
            }
        );
        assert_eq!(inno.split(5, &b), first);
        assert_eq!(inno.nodes.len(), 1);
    }

    #[test]
    fn test_split_collision_draws_fresh() {
        let meta = MetaGenome::new(2, 1, true);
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(7);
        inno.nodes.register(
            5,
            AddedNode {
                node: 3,
                incoming: 1,
                outgoing: 2,
            },
        );

        // holds innovation 1 already
        let g = genome(meta, &[(0, 2, 5), (1, 2, 1)]);
        let added = inno.split(5, &g);
        assert_eq!(
            added,
            AddedNode {
                node: 3,
                incoming: 7,
                outgoing: 8
            }
        );
        assert_eq!(inno.nodes.lookup(5).map(|a| a.incoming), Some(1));

        // holds node 3 already
        let g = genome(meta, &[(0, 3, 9), (3, 2, 10)]);
        assert_ne!(inno.split(5, &g).node, 3);
    }

    #[test]
    fn test_next_generation() {
        let mut inno = InnoGen::new(&MetaGenome::new(1, 1, true));
        assert_eq!(inno.generation.peek(), 0);
        assert_eq!(inno.next_generation(), 1);
        assert_eq!(inno.generation.peek(), 1);
    }

    #[test]
    fn test_resumed() {
        let meta = MetaGenome::new(2, 1, true);
        let pop = [
            Genome::new(
                meta,
                4,
                2,
                ConnectionGenes::from_genes(vec![
                    ConnectionGene::new(0, 2, 1., 0),
                    ConnectionGene::new(0, 6, 1., 7),
                    ConnectionGene::new(6, 2, 1., 8),
                ])
                .unwrap(),
            ),
            genome(meta, &[(1, 2, 3)]),
        ];
        let mut inno = InnoGen::resumed(&meta, &pop);
        assert_eq!(inno.genome_ids.peek(), 5);
        assert_eq!(inno.innovations.peek(), 9);
        assert_eq!(inno.node_ids.peek(), 7);
        assert_eq!(inno.generation.peek(), 2);
        assert_eq!(inno.connections.len(), 4);

        let fresh = genome(meta, &[(0, 2, 0)]);
        assert_eq!(inno.path(DirectedConnection::new(1, 2), &fresh), 3);

        let empty = InnoGen::resumed(&meta, &[]);
        assert_eq!(empty.node_ids.peek(), meta.fixed());
        assert_eq!(empty.innovations.peek(), 0);
    }
}
