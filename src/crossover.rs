//! Sexual reproduction, and the gene correlation it shares with compatibility distance.

use crate::{
    constants::{
        ESPEON_DELTA_DISJOINT_COEFFICIENT, ESPEON_DELTA_EXCESS_COEFFICIENT,
        ESPEON_DELTA_NORMALIZATION_THRESHOLD, ESPEON_DELTA_PARAM_COEFFICIENT,
    },
    error::{GenomeError, GenomeResult},
    genome::{ConnectionGene, ConnectionGenes, Genome},
    graph::DirectedConnection,
    innovation::InnoGen,
    random::{EvolutionEvent, Happens},
};
use core::cmp::{max, Ordering};
use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// How a gene from one list relates to the other list. Positions index the endpoint-sorted
/// gene arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// both lists hold this innovation id
    Matching { left: usize, right: usize },
    /// only `side` holds this innovation id, and the other list has higher ones
    Disjoint { side: Side, pos: usize },
    /// only `side` holds this innovation id, and it's past the end of the other list
    Excess { side: Side, pos: usize },
}

/// Walks two gene lists in innovation id order, classifying each gene exactly once
pub struct Correlate<'a> {
    l: &'a ConnectionGenes,
    r: &'a ConnectionGenes,
    li: usize,
    ri: usize,
}

pub fn correlate<'a>(l: &'a ConnectionGenes, r: &'a ConnectionGenes) -> Correlate<'a> {
    Correlate { l, r, li: 0, ri: 0 }
}

impl Iterator for Correlate<'_> {
    type Item = Correlation;

    fn next(&mut self) -> Option<Correlation> {
        let l_pos = self.l.inno_order().get(self.li).copied();
        let r_pos = self.r.inno_order().get(self.ri).copied();

        let item = match (l_pos, r_pos) {
            (None, None) => return None,
            (Some(pos), None) => {
                self.li += 1;
                Correlation::Excess {
                    side: Side::Left,
                    pos,
                }
            }
            (None, Some(pos)) => {
                self.ri += 1;
                Correlation::Excess {
                    side: Side::Right,
                    pos,
                }
            }
            (Some(left), Some(right)) => {
                match self.l.innos()[left].cmp(&self.r.innos()[right]) {
                    Ordering::Equal => {
                        self.li += 1;
                        self.ri += 1;
                        Correlation::Matching { left, right }
                    }
                    Ordering::Less => {
                        self.li += 1;
                        Correlation::Disjoint {
                            side: Side::Left,
                            pos: left,
                        }
                    }
                    Ordering::Greater => {
                        self.ri += 1;
                        Correlation::Disjoint {
                            side: Side::Right,
                            pos: right,
                        }
                    }
                }
            }
        };

        Some(item)
    }
}

/// Tallies of a [correlate] pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorrelationCounts {
    pub matching: usize,
    pub disjoint: usize,
    pub excess: usize,
    /// sum of weight differences across matching genes
    pub weight_diff: f64,
}

impl CorrelationCounts {
    pub fn of(l: &ConnectionGenes, r: &ConnectionGenes) -> Self {
        correlate(l, r).fold(Self::default(), |mut counts, c| {
            match c {
                Correlation::Matching { left, right } => {
                    counts.matching += 1;
                    counts.weight_diff += l.gene(left).param_diff(&r.gene(right));
                }
                Correlation::Disjoint { .. } => counts.disjoint += 1,
                Correlation::Excess { .. } => counts.excess += 1,
            }
            counts
        })
    }

    /// Mean weight difference of matching genes, 0 if there are none
    pub fn avg_weight_diff(&self) -> f64 {
        if self.matching == 0 {
            0.
        } else {
            self.weight_diff / self.matching as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaCoefficients {
    pub excess: f64,
    pub disjoint: f64,
    pub param: f64,
    /// gene counts below this aren't normalized
    pub normalization_threshold: f64,
}

impl Default for DeltaCoefficients {
    fn default() -> Self {
        Self {
            excess: ESPEON_DELTA_EXCESS_COEFFICIENT,
            disjoint: ESPEON_DELTA_DISJOINT_COEFFICIENT,
            param: ESPEON_DELTA_PARAM_COEFFICIENT,
            normalization_threshold: ESPEON_DELTA_NORMALIZATION_THRESHOLD,
        }
    }
}

/// Compatibility distance between two gene lists
pub fn delta(l: &ConnectionGenes, r: &ConnectionGenes, c: &DeltaCoefficients) -> f64 {
    let counts = CorrelationCounts::of(l, r);
    let size = max(l.len(), r.len()) as f64;
    let norm = if size < c.normalization_threshold {
        1.
    } else {
        size
    };

    (c.excess * counts.excess as f64 + c.disjoint * counts.disjoint as f64) / norm
        + c.param * counts.avg_weight_diff()
}

/// Adjacency over node ids, for rejecting inherited genes that would close a cycle
#[derive(Debug, Default)]
struct IdGraph {
    out: FxHashMap<usize, Vec<usize>>,
}

impl IdGraph {
    fn add(&mut self, conn: DirectedConnection) {
        self.out.entry(conn.source).or_default().push(conn.target);
    }

    /// Whether `conn.target` already reaches `conn.source`
    fn would_cycle(&self, conn: &DirectedConnection) -> bool {
        if conn.source == conn.target {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![conn.target];
        while let Some(node) = stack.pop() {
            if node == conn.source {
                return true;
            }
            if visited.insert(node) {
                stack.extend(self.out.get(&node).into_iter().flatten().copied());
            }
        }
        false
    }
}

/// Collects child genes, keeping only the first gene seen for any pair of endpoints
struct GeneBuilder {
    genes: Vec<ConnectionGene>,
    seen: FxHashSet<DirectedConnection>,
    /// present when the child must stay acyclic
    graph: Option<IdGraph>,
}

impl GeneBuilder {
    fn new(capacity: usize, acyclic: bool) -> Self {
        Self {
            genes: Vec::with_capacity(capacity),
            seen: FxHashSet::default(),
            graph: acyclic.then(IdGraph::default),
        }
    }

    /// Add a gene the fitter parent holds, which can't close a cycle among its own genes
    fn push_primary(&mut self, gene: ConnectionGene) -> bool {
        if !self.seen.insert(gene.conn) {
            return false;
        }

        if let Some(graph) = self.graph.as_mut() {
            graph.add(gene.conn);
        }
        self.genes.push(gene);
        true
    }

    fn push_secondary(&mut self, gene: ConnectionGene) -> bool {
        if self.seen.contains(&gene.conn)
            || self
                .graph
                .as_ref()
                .is_some_and(|graph| graph.would_cycle(&gene.conn))
        {
            return false;
        }

        self.push_primary(gene)
    }
}

/// A child of `l` and `r`, where `l_fit` is how `l`'s fitness compares to `r`'s.
///
/// Matching genes come from either parent at random. Disjoint and excess genes always come
/// from the fitter parent, and from the other one only when [EvolutionEvent::KeepSecondary]
/// happens for this crossover. Ties in fitness pick the fitter parent at random.
///
/// Fails with [GenomeError::MetaMismatch] when the parents don't share their [MetaGenome].
///
/// [MetaGenome]: crate::genome::MetaGenome
pub fn crossover(
    l: &Genome,
    r: &Genome,
    l_fit: Ordering,
    inno: &mut InnoGen,
    rng: &mut impl Happens,
) -> GenomeResult<Genome> {
    if l.meta() != r.meta() {
        return Err(GenomeError::MetaMismatch {
            left: l.id(),
            right: r.id(),
        });
    }

    let fitter = match l_fit {
        Ordering::Greater => Side::Left,
        Ordering::Less => Side::Right,
        Ordering::Equal if rng.happens(EvolutionEvent::PickLEQ) => Side::Left,
        Ordering::Equal => Side::Right,
    };
    let keep_secondary = rng.happens(EvolutionEvent::KeepSecondary);

    let meta = *l.meta();
    let (lg, rg) = (l.genes(), r.genes());
    let mut builder = GeneBuilder::new(max(lg.len(), rg.len()), meta.acyclic);
    let mut secondary = Vec::new();

    for c in correlate(lg, rg) {
        match c {
            Correlation::Matching { left, right } => {
                let gene = if rng.happens(EvolutionEvent::PickMatched) {
                    lg.gene(left)
                } else {
                    rg.gene(right)
                };
                builder.push_primary(gene);
            }
            Correlation::Disjoint { side, pos } | Correlation::Excess { side, pos } => {
                let gene = match side {
                    Side::Left => lg.gene(pos),
                    Side::Right => rg.gene(pos),
                };
                if side == fitter {
                    builder.push_primary(gene);
                } else if keep_secondary {
                    secondary.push(gene);
                }
            }
        }
    }

    // the fitter parent's topology goes in first, so it wins any endpoint collision
    let offered = secondary.len();
    let kept = secondary
        .into_iter()
        .filter(|&gene| builder.push_secondary(gene))
        .count();

    trace!(
        left = l.id(),
        right = r.id(),
        ?fitter,
        keep_secondary,
        offered,
        kept,
        genes = builder.genes.len(),
        "crossover"
    );

    let genes = ConnectionGenes::from_genes(builder.genes)?;
    Ok(Genome::new(
        meta,
        inno.genome_ids.next(),
        inno.generation.peek(),
        genes,
    ))
}
