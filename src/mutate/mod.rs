//! Asexual reproduction: strategies that each make one kind of change to a parent, and
//! [AsexualReproduction], which picks between them.

pub mod add_connection;
pub mod add_node;
pub mod delete_connection;
pub mod weights;

pub use add_connection::{AddAcyclicConnection, AddCyclicConnection};
pub use add_node::AddNode;
pub use delete_connection::DeleteConnection;
pub use weights::{MutateWeights, Perturbance, Selection, WeightMutation, WeightMutationScheme};

use crate::{
    constants::{
        ESPEON_ADD_CONNECTION_PROB, ESPEON_ADD_NODE_PROB, ESPEON_DELETE_CONNECTION_PROB,
        ESPEON_MUTATE_WEIGHTS_PROB, ESPEON_SIMPLIFY_DELETE_CONNECTION_PROB,
        ESPEON_SIMPLIFY_MUTATE_WEIGHTS_PROB,
    },
    error::SettingsError,
    genome::{Genome, MetaGenome},
    innovation::InnoGen,
    random::Happens,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One way of deriving a child from a single parent. The parent is never modified.
pub trait Strategy {
    /// A child of `parent`, or None if this strategy can't change it
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationKind {
    Weights,
    AddNode,
    AddConnection,
    DeleteConnection,
}

impl MutationKind {
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Weights,
        MutationKind::AddNode,
        MutationKind::AddConnection,
        MutationKind::DeleteConnection,
    ];
}

/// Relative probability of each kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationSettings {
    pub weights: f64,
    pub add_node: f64,
    pub add_connection: f64,
    pub delete_connection: f64,
}

impl Default for MutationSettings {
    fn default() -> Self {
        Self {
            weights: ESPEON_MUTATE_WEIGHTS_PROB,
            add_node: ESPEON_ADD_NODE_PROB,
            add_connection: ESPEON_ADD_CONNECTION_PROB,
            delete_connection: ESPEON_DELETE_CONNECTION_PROB,
        }
    }
}

impl MutationSettings {
    /// Settings that only ever shrink a genome
    pub fn simplifying() -> Self {
        Self {
            weights: ESPEON_SIMPLIFY_MUTATE_WEIGHTS_PROB,
            add_node: 0.,
            add_connection: 0.,
            delete_connection: ESPEON_SIMPLIFY_DELETE_CONNECTION_PROB,
        }
    }

    pub fn probability(&self, kind: MutationKind) -> f64 {
        match kind {
            MutationKind::Weights => self.weights,
            MutationKind::AddNode => self.add_node,
            MutationKind::AddConnection => self.add_connection,
            MutationKind::DeleteConnection => self.delete_connection,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (kind, value) in [
            ("weight", self.weights),
            ("add node", self.add_node),
            ("add connection", self.add_connection),
            ("delete connection", self.delete_connection),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(SettingsError::Probability { kind, value });
            }
        }

        let sum = MutationKind::ALL
            .iter()
            .map(|&kind| self.probability(kind))
            .sum::<f64>();
        if (sum - 1.).abs() > 1e-6 {
            return Err(SettingsError::ProbabilitySum(sum));
        }

        Ok(())
    }
}

/// A discrete distribution over [MutationKind]s, from which outcomes can be removed
#[derive(Debug, Clone, PartialEq)]
pub struct MutationDistribution {
    outcomes: Vec<(MutationKind, f64)>,
}

impl MutationDistribution {
    pub fn new(settings: &MutationSettings) -> Self {
        Self {
            outcomes: MutationKind::ALL
                .iter()
                .map(|&kind| (kind, settings.probability(kind)))
                .filter(|&(_, p)| p > 0.)
                .collect(),
        }
    }

    /// This distribution without `kind`, the remaining outcomes keeping their relative odds
    pub fn without(&self, kind: MutationKind) -> Self {
        Self {
            outcomes: self
                .outcomes
                .iter()
                .copied()
                .filter(|&(k, _)| k != kind)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn contains(&self, kind: MutationKind) -> bool {
        self.outcomes.iter().any(|&(k, _)| k == kind)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Option<MutationKind> {
        let total = self.outcomes.iter().map(|&(_, p)| p).sum::<f64>();
        if total <= 0. {
            return None;
        }

        let mut pick = rng.random_range(0. ..total);
        self.outcomes
            .iter()
            .find(|&&(_, p)| {
                pick -= p;
                pick < 0.
            })
            .or(self.outcomes.last())
            .map(|&(kind, _)| kind)
    }
}

#[derive(Debug, Clone)]
struct MutationDistributions {
    all: MutationDistribution,
    /// without deletion, for parents with too few connections to lose one
    non_destructive: MutationDistribution,
}

impl MutationDistributions {
    fn new(settings: &MutationSettings) -> Self {
        let all = MutationDistribution::new(settings);
        Self {
            non_destructive: all.without(MutationKind::DeleteConnection),
            all,
        }
    }
}

/// Whether reproduction is currently growing genomes or pruning them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplexityMode {
    #[default]
    Complexifying,
    Simplifying,
}

#[derive(Debug, Clone)]
enum AddConnection {
    Acyclic(AddAcyclicConnection),
    Cyclic(AddCyclicConnection),
}

impl Strategy for AddConnection {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        match self {
            AddConnection::Acyclic(s) => s.create_child(parent, inno, rng),
            AddConnection::Cyclic(s) => s.create_child(parent, inno, rng),
        }
    }
}

/// Derives children from single parents by choosing between the mutation strategies.
///
/// A strategy that can't change the parent is removed from the choice and another is picked.
/// Failing to add a connection falls straight back to a weight mutation.
#[derive(Debug, Clone)]
pub struct AsexualReproduction {
    complexifying: MutationDistributions,
    simplifying: MutationDistributions,
    mode: ComplexityMode,
    weights: MutateWeights,
    add_node: AddNode,
    add_connection: AddConnection,
    delete_connection: DeleteConnection,
}

impl AsexualReproduction {
    pub fn new(
        meta: &MetaGenome,
        settings: &MutationSettings,
        scheme: WeightMutationScheme,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        scheme.validate()?;
        let simplifying = MutationSettings::simplifying();
        simplifying.validate()?;

        Ok(Self {
            complexifying: MutationDistributions::new(settings),
            simplifying: MutationDistributions::new(&simplifying),
            mode: ComplexityMode::Complexifying,
            weights: MutateWeights::new(scheme),
            add_node: AddNode,
            add_connection: if meta.acyclic {
                AddConnection::Acyclic(AddAcyclicConnection::default())
            } else {
                AddConnection::Cyclic(AddCyclicConnection::default())
            },
            delete_connection: DeleteConnection,
        })
    }

    pub fn mode(&self) -> ComplexityMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ComplexityMode) {
        self.mode = mode;
    }

    /// The distribution a child of `parent` is chosen from
    pub fn distribution(&self, parent: &Genome) -> &MutationDistribution {
        let dists = match self.mode {
            ComplexityMode::Complexifying => &self.complexifying,
            ComplexityMode::Simplifying => &self.simplifying,
        };

        if parent.len() < 2 {
            &dists.non_destructive
        } else {
            &dists.all
        }
    }

    /// Apply a single mutation of kind `kind` to `parent`
    pub fn mutate(
        &mut self,
        kind: MutationKind,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        match kind {
            MutationKind::Weights => self.weights.create_child(parent, inno, rng),
            MutationKind::AddNode => self.add_node.create_child(parent, inno, rng),
            MutationKind::AddConnection => self
                .add_connection
                .create_child(parent, inno, rng)
                .or_else(|| {
                    debug!(parent = parent.id(), "add connection failed, mutating weights");
                    self.weights.create_child(parent, inno, rng)
                }),
            MutationKind::DeleteConnection => {
                self.delete_connection.create_child(parent, inno, rng)
            }
        }
    }
}

impl Strategy for AsexualReproduction {
    /// Always produces a child: should every kind of mutation fail, the child is a copy of the
    /// parent under a new id
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        let mut dist = self.distribution(parent).clone();
        while let Some(kind) = dist.sample(rng) {
            if let Some(child) = self.mutate(kind, parent, inno, rng) {
                return Some(child);
            }
            debug!(parent = parent.id(), ?kind, "mutation failed");
            dist = dist.without(kind);
        }

        debug!(parent = parent.id(), "every mutation failed, copying parent");
        Some(parent.reweighted(inno.genome_ids.next(), inno.generation.peek(), |_| ()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        genome::{ConnectionGene, ConnectionGenes},
        random::{ProbBinding, ProbStatic},
    };
    use rand::{rngs::StdRng, SeedableRng};

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

    fn rng(seed: u64) -> ProbBinding<ProbStatic, StdRng> {
        ProbBinding::new(ProbStatic::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_settings_validate() {
        assert_eq!(MutationSettings::default().validate(), Ok(()));
        assert_eq!(MutationSettings::simplifying().validate(), Ok(()));
        assert_eq!(
            MutationSettings {
                weights: 1.5,
                ..Default::default()
            }
            .validate(),
            Err(SettingsError::Probability {
                kind: "weight",
                value: 1.5
            })
        );
        assert!(matches!(
            MutationSettings {
                add_node: 0.5,
                ..Default::default()
            }
            .validate(),
            Err(SettingsError::ProbabilitySum(_))
        ));
    }

    #[test]
    fn test_rejects_bad_weight_scheme() {
        let scheme = WeightMutationScheme {
            mutations: vec![WeightMutation::new(
                1.,
                Selection::Count(3),
                Perturbance::JiggleUniform { scale: -0.1 },
            )],
        };
        assert!(matches!(
            AsexualReproduction::new(
                &MetaGenome::new(2, 1, true),
                &MutationSettings::default(),
                scheme
            ),
            Err(SettingsError::WeightMutation {
                kind: "jiggle scale",
                ..
            })
        ));
    }

    #[test]
    fn test_distribution_sample() {
        let mut rng = rng(0);
        let dist = MutationDistribution::new(&MutationSettings {
            weights: 0.,
            add_node: 0.5,
            add_connection: 0.5,
            delete_connection: 0.,
        });
        assert!(!dist.contains(MutationKind::Weights));
        let mut counts = [0usize; 2];
        for _ in 0..1000 {
            match dist.sample(&mut rng) {
                Some(MutationKind::AddNode) => counts[0] += 1,
                Some(MutationKind::AddConnection) => counts[1] += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert!(counts.iter().all(|&c| c > 400));

        let only = dist.without(MutationKind::AddNode);
        for _ in 0..100 {
            assert_eq!(only.sample(&mut rng), Some(MutationKind::AddConnection));
        }
        assert_eq!(only.without(MutationKind::AddConnection).sample(&mut rng), None);
    }

    #[test]
    fn test_non_destructive_for_small_parents() {
        let meta = MetaGenome::new(2, 1, true);
        let repro =
            AsexualReproduction::new(&meta, &MutationSettings::default(), Default::default())
                .unwrap();
        let small = genome(meta, &[(0, 2, 0)]);
        let large = genome(meta, &[(0, 2, 0), (1, 2, 1)]);
        assert!(!repro
            .distribution(&small)
            .contains(MutationKind::DeleteConnection));
        assert!(repro
            .distribution(&large)
            .contains(MutationKind::DeleteConnection));
    }

    #[test]
    fn test_add_connection_falls_back_to_weights() {
        // saturated: no connection can be added
        let meta = MetaGenome::new(2, 1, true);
        let parent = genome(meta, &[(0, 2, 0), (1, 2, 1)]);
        let mut inno = InnoGen::new(&meta);
        let mut rng = rng(1);
        let mut repro =
            AsexualReproduction::new(&meta, &MutationSettings::default(), Default::default())
                .unwrap();

        let child = repro
            .mutate(MutationKind::AddConnection, &parent, &mut inno, &mut rng)
            .unwrap();
        assert_eq!(child.genes().conns(), parent.genes().conns());
        assert_ne!(child.genes().weights(), parent.genes().weights());
    }

    #[test]
    fn test_exhausted_copies_parent() {
        let meta = MetaGenome::new(1, 1, true);
        let parent = genome(meta, &[(0, 1, 0)]);
        let mut inno = InnoGen::new(&meta);
        inno.genome_ids.reset(10);
        let mut rng = rng(2);
        let mut repro = AsexualReproduction::new(
            &meta,
            &MutationSettings {
                weights: 0.,
                add_node: 0.,
                add_connection: 0.,
                delete_connection: 1.,
            },
            Default::default(),
        )
        .unwrap();

        let child = repro.create_child(&parent, &mut inno, &mut rng).unwrap();
        assert_eq!(child.id(), 10);
        assert_eq!(child.genes(), parent.genes());
    }

    #[test]
    fn test_simplifying_never_grows() {
        let meta = MetaGenome::new(2, 2, true);
        let mut parent = genome(
            meta,
            &[(0, 2, 0), (0, 5, 1), (1, 3, 2), (5, 3, 3), (1, 5, 4), (5, 2, 5)],
        );
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(6);
        let mut rng = rng(3);
        let mut repro =
            AsexualReproduction::new(&meta, &MutationSettings::default(), Default::default())
                .unwrap();
        repro.set_mode(ComplexityMode::Simplifying);

        for _ in 0..100 {
            let child = repro.create_child(&parent, &mut inno, &mut rng).unwrap();
            assert!(child.len() <= parent.len());
            assert!(!child.is_empty());
            parent = child;
        }
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn test_complexifying_stays_valid() {
        let meta = MetaGenome::new(3, 2, true);
        let mut parent = genome(meta, &[(0, 3, 0), (1, 4, 1)]);
        let mut inno = InnoGen::new(&meta);
        inno.innovations.reset(2);
        let mut rng = rng(4);
        let mut repro = AsexualReproduction::new(
            &meta,
            &MutationSettings {
                weights: 0.4,
                add_node: 0.2,
                add_connection: 0.3,
                delete_connection: 0.1,
            },
            Default::default(),
        )
        .unwrap();

        for _ in 0..300 {
            parent = repro.create_child(&parent, &mut inno, &mut rng).unwrap();
            assert_eq!(parent.validate(), Ok(()));
            assert!(!parent.is_empty());
        }
    }
}
