use crate::graph::DirectedConnection;
use thiserror::Error;

/// A broken genome invariant. These are never repaired: a genome that fails validation was built
/// from malformed input or by a bug, and nothing downstream can trust it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenomeError {
    #[error("connection genes out of order at position {0}")]
    Unsorted(usize),

    #[error("duplicate connection {0:?}")]
    DuplicateConnection(DirectedConnection),

    #[error("duplicate innovation id {0}")]
    DuplicateInnovation(usize),

    #[error("innovation order is not a valid permutation of the connection genes")]
    InnovationOrder,

    #[error("gene arrays differ in length ({connections} connections, {weights} weights, {innos} innovation ids)")]
    GeneArrayLength {
        connections: usize,
        weights: usize,
        innos: usize,
    },

    #[error("connection {0:?} targets an input node")]
    InputTarget(DirectedConnection),

    #[error("node {0} is neither a fixed node nor a known hidden node")]
    UnknownNode(usize),

    #[error("hidden node ids don't match those referenced by connections")]
    HiddenNodes,

    #[error("hidden node id {0} collides with the input/output id range")]
    HiddenInFixedRange(usize),

    #[error("compiled graph doesn't match the genome's connections")]
    Digraph,

    #[error("acyclic genome contains a cycle")]
    Cyclic,

    #[error("weight {weight} of connection {connection:?} is not finite")]
    NonFiniteWeight {
        connection: DirectedConnection,
        weight: f64,
    },

    #[error("weight scale {0} is not a finite non-negative number")]
    WeightScale(f64),

    #[error("parents {left} and {right} have different genome metadata")]
    MetaMismatch { left: usize, right: usize },

    #[error("{inputs} inputs and {outputs} outputs overflow the node id space")]
    NodeCount { inputs: usize, outputs: usize },
}

pub type GenomeResult<T> = Result<T, GenomeError>;

/// Reproduction settings that can't describe a valid choice of mutation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{kind} probability {value} is outside [0, 1]")]
    Probability { kind: &'static str, value: f64 },

    #[error("mutation probabilities sum to {0}, not 1")]
    ProbabilitySum(f64),

    #[error("weight mutation {index} has a {kind} of {value}, which is negative or not finite")]
    WeightMutation {
        index: usize,
        kind: &'static str,
        value: f64,
    },

    #[error("weight mutation {index} selects a proportion of {value}, outside [0, 1]")]
    Proportion { index: usize, value: f64 },

    #[error("weight mutation scheme has no mutation with a positive probability")]
    EmptyScheme,
}
