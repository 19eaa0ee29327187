use crate::{
    error::{GenomeError, GenomeResult},
    graph::{pool::PooledIndices, DirectedConnection},
};
use serde::{Deserialize, Serialize};

/// A single weighted connection, as it's handed into and out of a [ConnectionGenes]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub conn: DirectedConnection,
    pub weight: f64,
    pub inno: usize,
}

impl ConnectionGene {
    pub fn new(source: usize, target: usize, weight: f64, inno: usize) -> Self {
        Self {
            conn: DirectedConnection::new(source, target),
            weight,
            inno,
        }
    }

    /// difference of connection parameters between this and another connection
    /// with the same innovation id
    pub fn param_diff(&self, other: &Self) -> f64 {
        (self.weight - other.weight).abs()
    }
}

/// A genome's connection genes, held as parallel arrays sorted by endpoints.
///
/// `inno_order` lists gene positions in ascending innovation id order, so a gene list can be
/// walked either by endpoints or by innovation id without keeping two copies of the genes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionGenes {
    conns: Vec<DirectedConnection>,
    weights: Vec<f64>,
    innos: Vec<usize>,
    inno_order: Vec<usize>,
}

impl ConnectionGenes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Genes from an arbitrarily ordered list, which must hold no duplicate
    /// endpoints or innovation ids
    pub fn from_genes(mut genes: Vec<ConnectionGene>) -> GenomeResult<Self> {
        genes.sort_unstable_by_key(|g| g.conn);
        if let Some(w) = genes.windows(2).find(|w| w[0].conn == w[1].conn) {
            return Err(GenomeError::DuplicateConnection(w[0].conn));
        }

        let mut store = Self {
            conns: genes.iter().map(|g| g.conn).collect(),
            weights: genes.iter().map(|g| g.weight).collect(),
            innos: genes.iter().map(|g| g.inno).collect(),
            inno_order: (0..genes.len()).collect(),
        };

        let innos = &store.innos;
        store.inno_order.sort_unstable_by_key(|&pos| innos[pos]);
        if let Some(w) = store
            .inno_order
            .windows(2)
            .find(|w| innos[w[0]] == innos[w[1]])
        {
            return Err(GenomeError::DuplicateInnovation(innos[w[0]]));
        }

        Ok(store)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.conns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    #[inline]
    pub fn conns(&self) -> &[DirectedConnection] {
        &self.conns
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weights may be rewritten in place, since they play no part in either ordering
    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    #[inline]
    pub fn innos(&self) -> &[usize] {
        &self.innos
    }

    /// Gene positions in ascending innovation id order
    #[inline]
    pub fn inno_order(&self) -> &[usize] {
        &self.inno_order
    }

    #[inline]
    pub fn gene(&self, idx: usize) -> ConnectionGene {
        ConnectionGene {
            conn: self.conns[idx],
            weight: self.weights[idx],
            inno: self.innos[idx],
        }
    }

    /// Binary search for `conn`, Ok with its position if present,
    /// otherwise Err with the position where it would be inserted
    #[inline]
    pub fn search(&self, conn: &DirectedConnection) -> Result<usize, usize> {
        self.conns.binary_search(conn)
    }

    /// Position of the gene with innovation id `inno`
    pub fn position_of_inno(&self, inno: usize) -> Option<usize> {
        let rank = self.inno_rank(inno);
        self.inno_order
            .get(rank)
            .copied()
            .filter(|&pos| self.innos[pos] == inno)
    }

    #[inline]
    pub fn contains_inno(&self, inno: usize) -> bool {
        self.position_of_inno(inno).is_some()
    }

    pub fn max_inno(&self) -> Option<usize> {
        self.inno_order.last().map(|&pos| self.innos[pos])
    }

    /// Number of genes with an innovation id below `inno`
    #[inline]
    fn inno_rank(&self, inno: usize) -> usize {
        self.inno_order.partition_point(|&pos| self.innos[pos] < inno)
    }

    /// Insert `gene` at its sorted position, returning that position.
    ///
    /// Panics if a gene with the same endpoints is already present: callers are expected to
    /// [ConnectionGenes::search] first.
    pub fn insert(&mut self, gene: ConnectionGene) -> usize {
        match self.try_insert(gene) {
            Ok(idx) => idx,
            Err(e) => panic!("cannot insert {gene:?}: {e}"),
        }
    }

    pub fn try_insert(&mut self, gene: ConnectionGene) -> GenomeResult<usize> {
        let idx = match self.search(&gene.conn) {
            Ok(_) => return Err(GenomeError::DuplicateConnection(gene.conn)),
            Err(idx) => idx,
        };

        let rank = self.inno_rank(gene.inno);
        if self.inno_order.get(rank).map(|&pos| self.innos[pos]) == Some(gene.inno) {
            return Err(GenomeError::DuplicateInnovation(gene.inno));
        }

        for pos in self.inno_order.iter_mut().filter(|pos| **pos >= idx) {
            *pos += 1;
        }
        self.inno_order.insert(rank, idx);

        self.conns.insert(idx, gene.conn);
        self.weights.insert(idx, gene.weight);
        self.innos.insert(idx, gene.inno);
        Ok(idx)
    }

    /// Remove and return the gene at position `idx`
    pub fn remove(&mut self, idx: usize) -> ConnectionGene {
        let gene = self.gene(idx);
        let rank = self.inno_rank(gene.inno);
        self.inno_order.remove(rank);
        for pos in self.inno_order.iter_mut().filter(|pos| **pos > idx) {
            *pos -= 1;
        }

        self.conns.remove(idx);
        self.weights.remove(idx);
        self.innos.remove(idx);
        gene
    }

    /// A copy of these genes with the gene at `remove` dropped and `insert` merged in, built in
    /// one pass rather than by repeated shifting.
    ///
    /// `insert` must be sorted by endpoints, and hold no endpoints or innovation ids already in
    /// the surviving genes.
    pub fn spliced(&self, remove: Option<usize>, insert: &[ConnectionGene]) -> Self {
        debug_assert!(insert.windows(2).all(|w| w[0].conn < w[1].conn));

        let len = self.len() - usize::from(remove.is_some()) + insert.len();
        let mut conns = Vec::with_capacity(len);
        let mut weights = Vec::with_capacity(len);
        let mut innos = Vec::with_capacity(len);

        // new position of every old gene, usize::MAX for the removed one
        let mut new_pos = PooledIndices::filled(self.len(), usize::MAX);
        let mut insert_pos = PooledIndices::with_capacity(insert.len());

        let mut pending = insert.iter().peekable();
        for old in 0..self.len() {
            if Some(old) == remove {
                continue;
            }

            while let Some(gene) = pending.next_if(|g| g.conn < self.conns[old]) {
                insert_pos.push(conns.len());
                conns.push(gene.conn);
                weights.push(gene.weight);
                innos.push(gene.inno);
            }

            debug_assert!(pending.peek().map_or(true, |g| g.conn != self.conns[old]));
            new_pos[old] = conns.len();
            conns.push(self.conns[old]);
            weights.push(self.weights[old]);
            innos.push(self.innos[old]);
        }

        for gene in pending {
            insert_pos.push(conns.len());
            conns.push(gene.conn);
            weights.push(gene.weight);
            innos.push(gene.inno);
        }

        // merge the surviving innovation order with the inserted genes, by innovation id
        let mut by_inno = PooledIndices::with_capacity(insert.len());
        by_inno.extend(0..insert.len());
        by_inno.sort_unstable_by_key(|&i| insert[i].inno);

        let mut inno_order = Vec::with_capacity(len);
        let mut added = by_inno.iter().map(|&i| insert_pos[i]).peekable();
        for pos in self
            .inno_order
            .iter()
            .map(|&old| new_pos[old])
            .filter(|&pos| pos != usize::MAX)
        {
            while let Some(add) = added.next_if(|&add| innos[add] < innos[pos]) {
                inno_order.push(add);
            }
            inno_order.push(pos);
        }
        inno_order.extend(added);

        Self {
            conns,
            weights,
            innos,
            inno_order,
        }
    }

    /// Genes in endpoint order
    pub fn iter(&self) -> impl Iterator<Item = ConnectionGene> + '_ {
        (0..self.len()).map(|idx| self.gene(idx))
    }

    /// Genes in innovation id order
    pub fn iter_by_inno(&self) -> impl Iterator<Item = ConnectionGene> + '_ {
        self.inno_order.iter().map(|&idx| self.gene(idx))
    }

    /// Check every invariant this store relies on
    pub fn validate(&self) -> GenomeResult<()> {
        if self.weights.len() != self.conns.len()
            || self.innos.len() != self.conns.len()
            || self.inno_order.len() != self.conns.len()
        {
            return Err(GenomeError::GeneArrayLength {
                connections: self.conns.len(),
                weights: self.weights.len(),
                innos: self.innos.len(),
            });
        }

        for (idx, w) in self.conns.windows(2).enumerate() {
            if w[0] == w[1] {
                return Err(GenomeError::DuplicateConnection(w[0]));
            }
            if w[0] > w[1] {
                return Err(GenomeError::Unsorted(idx + 1));
            }
        }

        let mut seen = vec![false; self.len()];
        for &pos in &self.inno_order {
            if pos >= self.len() || seen[pos] {
                return Err(GenomeError::InnovationOrder);
            }
            seen[pos] = true;
        }

        for w in self.inno_order.windows(2) {
            match self.innos[w[0]].cmp(&self.innos[w[1]]) {
                core::cmp::Ordering::Less => (),
                core::cmp::Ordering::Equal => {
                    return Err(GenomeError::DuplicateInnovation(self.innos[w[0]]))
                }
                core::cmp::Ordering::Greater => return Err(GenomeError::InnovationOrder),
            }
        }

        Ok(())
    }
}
