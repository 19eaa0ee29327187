//! Genome graphs for NEAT: connection genes kept in endpoint order with an innovation index,
//! cycle detection, innovation ledgers, structural and weight mutation, and crossover.

pub mod constants;
pub mod crossover;
pub mod error;
pub mod genome;
pub mod graph;
pub mod innovation;
pub mod macros;
pub mod mutate;
pub mod population;
pub mod random;
pub mod sequence;
pub mod serialize;

pub use crossover::{crossover, delta, DeltaCoefficients};
pub use error::{GenomeError, GenomeResult, SettingsError};
pub use genome::{ConnectionGene, ConnectionGenes, Genome, MetaGenome};
pub use innovation::InnoGen;
pub use mutate::{AsexualReproduction, MutationSettings, Strategy};
pub use population::population_init;
pub use random::{Happens, Probabilities};
pub use serialize::{Load, Save};
