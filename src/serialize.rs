//! Json persistence for genomes, and anything else with serde support.
//!
//! A [Genome] is stored as its meta, ids and connection genes. Everything else it holds is
//! rebuilt on load, and loading rejects any genome that breaks an invariant.

use crate::{
    error::GenomeError,
    genome::{ConnectionGene, ConnectionGenes, Genome, MetaGenome},
};
use core::error::Error;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fs, path::Path};

/// Types that can be written out as json strings and files
pub trait Save {
    fn to_string(&self) -> Result<String, Box<dyn Error>>;

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }
}

/// Types that can be read back from json strings and files
pub trait Load: Sized {
    fn from_str(s: &str) -> Result<Self, Box<dyn Error>>;

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

impl<T: Serialize> Save for T {
    fn to_string(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: for<'de> Deserialize<'de>> Load for T {
    fn from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        serde_json::from_str(s).map_err(|op| op.into())
    }
}

#[derive(Serialize, Deserialize)]
struct GenomeRepr {
    meta: MetaGenome,
    id: usize,
    birth_generation: usize,
    connections: Vec<ConnectionGene>,
}

impl From<&Genome> for GenomeRepr {
    fn from(genome: &Genome) -> Self {
        Self {
            meta: *genome.meta(),
            id: genome.id(),
            birth_generation: genome.birth_generation(),
            connections: genome.genes().iter().collect(),
        }
    }
}

impl TryFrom<GenomeRepr> for Genome {
    type Error = GenomeError;

    fn try_from(repr: GenomeRepr) -> Result<Self, Self::Error> {
        Genome::try_new(
            repr.meta,
            repr.id,
            repr.birth_generation,
            ConnectionGenes::from_genes(repr.connections)?,
        )
    }
}

impl Serialize for Genome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GenomeRepr::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Genome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Genome::try_from(GenomeRepr::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}
