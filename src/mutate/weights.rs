use super::Strategy;
use crate::{
    constants::ESPEON_WEIGHT_JIGGLE_SIGMA, error::SettingsError, genome::Genome,
    innovation::InnoGen, random::Happens,
};
use rand::{seq::index, Rng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// How a selected weight is changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Perturbance {
    /// shift by a uniform sample from [-scale, scale]
    JiggleUniform { scale: f64 },
    /// shift by a gaussian sample
    JiggleGaussian { sigma: f64 },
    /// replace with a uniform sample from the whole weight range
    Reset,
}

/// Which weights are changed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Selection {
    /// each weight independently, with this probability
    Proportion(f64),
    /// exactly this many distinct weights, or all of them if there are fewer
    Count(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightMutation {
    /// relative likelihood of this mutation being chosen from its scheme
    pub probability: f64,
    pub selection: Selection,
    pub perturbance: Perturbance,
}

impl WeightMutation {
    pub const fn new(probability: f64, selection: Selection, perturbance: Perturbance) -> Self {
        Self {
            probability,
            selection,
            perturbance,
        }
    }

    /// Apply this mutation to `weights`, keeping them within [-scale, scale]
    pub fn apply(&self, weights: &mut [f64], scale: f64, rng: &mut impl Rng) {
        match self.selection {
            Selection::Proportion(p) => {
                let p = p.clamp(0., 1.);
                for w in weights.iter_mut() {
                    if rng.random_bool(p) {
                        *w = self.perturb(*w, scale, rng);
                    }
                }
            }
            Selection::Count(n) => {
                let n = n.min(weights.len());
                for idx in index::sample(rng, weights.len(), n) {
                    weights[idx] = self.perturb(weights[idx], scale, rng);
                }
            }
        }
    }

    fn perturb(&self, w: f64, scale: f64, rng: &mut impl Rng) -> f64 {
        let w = match self.perturbance {
            Perturbance::JiggleUniform { scale: jiggle } => w + rng.random_range(-jiggle..=jiggle),
            Perturbance::JiggleGaussian { sigma } => {
                w + sigma * rng.sample::<f64, _>(StandardNormal)
            }
            Perturbance::Reset => rng.random_range(-scale..=scale),
        };
        w.clamp(-scale, scale)
    }
}

/// A weighted choice between [WeightMutation]s, one of which is applied per mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMutationScheme {
    pub mutations: Vec<WeightMutation>,
}

impl Default for WeightMutationScheme {
    /// Mostly small gaussian jiggles of one to three weights, with the occasional reset
    fn default() -> Self {
        let jiggle = Perturbance::JiggleGaussian {
            sigma: ESPEON_WEIGHT_JIGGLE_SIGMA,
        };
        Self {
            mutations: vec![
                WeightMutation::new(0.5985, Selection::Count(1), jiggle),
                WeightMutation::new(0.2985, Selection::Count(2), jiggle),
                WeightMutation::new(0.0985, Selection::Count(3), jiggle),
                WeightMutation::new(0.015, Selection::Count(1), Perturbance::Reset),
                WeightMutation::new(0.015, Selection::Count(2), Perturbance::Reset),
                WeightMutation::new(0.015, Selection::Count(3), Perturbance::Reset),
            ],
        }
    }
}

impl WeightMutationScheme {
    /// Broader changes, for phases that prune structure rather than grow it
    pub fn simplifying() -> Self {
        let jiggle = Perturbance::JiggleUniform { scale: 0.05 };
        Self {
            mutations: vec![
                WeightMutation::new(0.125, Selection::Proportion(0.5), jiggle),
                WeightMutation::new(0.125, Selection::Proportion(0.1), jiggle),
                WeightMutation::new(0.125, Selection::Count(1), jiggle),
                WeightMutation::new(0.5, Selection::Proportion(0.1), Perturbance::Reset),
                WeightMutation::new(0.125, Selection::Count(1), Perturbance::Reset),
            ],
        }
    }

    /// Check that every mutation in this scheme can be applied
    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.;

        for (index, m) in self.mutations.iter().enumerate() {
            if !non_negative(m.probability) {
                return Err(SettingsError::WeightMutation {
                    index,
                    kind: "probability",
                    value: m.probability,
                });
            }

            if let Selection::Proportion(p) = m.selection {
                if !(0. ..=1.).contains(&p) {
                    return Err(SettingsError::Proportion { index, value: p });
                }
            }

            let jiggle = match m.perturbance {
                Perturbance::JiggleUniform { scale } => Some(("jiggle scale", scale)),
                Perturbance::JiggleGaussian { sigma } => Some(("jiggle sigma", sigma)),
                Perturbance::Reset => None,
            };
            if let Some((kind, value)) = jiggle.filter(|&(_, v)| !non_negative(v)) {
                return Err(SettingsError::WeightMutation { index, kind, value });
            }
        }

        if self.mutations.iter().all(|m| m.probability == 0.) {
            return Err(SettingsError::EmptyScheme);
        }

        Ok(())
    }

    /// Choose a mutation by relative probability
    pub fn choose(&self, rng: &mut impl Rng) -> Option<&WeightMutation> {
        let total = self.mutations.iter().map(|m| m.probability).sum::<f64>();
        if total <= 0. {
            return None;
        }

        let mut pick = rng.random_range(0. ..total);
        self.mutations
            .iter()
            .find(|m| {
                pick -= m.probability;
                pick < 0.
            })
            .or(self.mutations.last())
    }

    pub fn mutate(&self, weights: &mut [f64], scale: f64, rng: &mut impl Rng) {
        if let Some(mutation) = self.choose(rng) {
            mutation.apply(weights, scale, rng);
        }
    }
}

/// Perturbs the parent's weights, leaving its topology alone
#[derive(Debug, Clone, Default)]
pub struct MutateWeights {
    pub scheme: WeightMutationScheme,
}

impl MutateWeights {
    pub fn new(scheme: WeightMutationScheme) -> Self {
        Self { scheme }
    }
}

impl Strategy for MutateWeights {
    fn create_child(
        &mut self,
        parent: &Genome,
        inno: &mut InnoGen,
        rng: &mut impl Happens,
    ) -> Option<Genome> {
        let scale = parent.meta().weight_scale;
        Some(parent.reweighted(
            inno.genome_ids.next(),
            inno.generation.peek(),
            |weights| self.scheme.mutate(weights, scale, rng),
        ))
    }
}
