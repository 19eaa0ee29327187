//! Centralized defaults for Espeon genome and mutation parameters.
//!
//! All configurable parameters are defined here with the `ESPEON_` prefix.
//! Runtime configuration ([crate::mutate::MutationSettings], [crate::random::ProbStatic],
//! [crate::genome::MetaGenome]) starts from these values.

use crate::random::percent;

// ============================================================================
// Genome Parameters
// ============================================================================

/// Connection weights are kept within [-scale, scale]
pub const ESPEON_CONNECTION_WEIGHT_SCALE: f64 = 5.0;

/// Proportion of all input -> output connections each seed genome starts with
pub const ESPEON_SEED_CONNECTIONS_PROPORTION: f64 = 0.05;

// ============================================================================
// Mutation Type Probabilities
// ============================================================================

/// Probability of a weight-only mutation
pub const ESPEON_MUTATE_WEIGHTS_PROB: f64 = 0.94;

/// Probability of splitting a connection with a new node
pub const ESPEON_ADD_NODE_PROB: f64 = 0.01;

/// Probability of adding a new connection
pub const ESPEON_ADD_CONNECTION_PROB: f64 = 0.025;

/// Probability of deleting a connection
pub const ESPEON_DELETE_CONNECTION_PROB: f64 = 0.025;

/// Probability of a weight-only mutation while simplifying
pub const ESPEON_SIMPLIFY_MUTATE_WEIGHTS_PROB: f64 = 0.6;

/// Probability of deleting a connection while simplifying
pub const ESPEON_SIMPLIFY_DELETE_CONNECTION_PROB: f64 = 0.4;

// ============================================================================
// Structural Mutation Parameters
// ============================================================================

/// Candidate connections tried by add-connection before giving up
pub const ESPEON_ADD_CONNECTION_ATTEMPTS: usize = 5;

/// Scale of the narrow weight range that new connections are drawn from half the time,
/// relative to [ESPEON_CONNECTION_WEIGHT_SCALE]
pub const ESPEON_SMALL_WEIGHT_FACTOR: f64 = 0.01;

/// Probability that a new connection draws its weight from the narrow range
pub const ESPEON_SMALL_WEIGHT_PROB: u64 = percent(50);

// ============================================================================
// Weight Mutation Parameters
// ============================================================================

/// Standard deviation of the default gaussian weight jiggle
pub const ESPEON_WEIGHT_JIGGLE_SIGMA: f64 = 0.01;

// ============================================================================
// Crossover Parameters
// ============================================================================

/// Probability that the less-fit parent's disjoint and excess genes are inherited
pub const ESPEON_CROSSOVER_KEEP_SECONDARY_PROB: u64 = percent(10);

/// Probability of taking the left parent's copy of a matching gene
pub const ESPEON_CROSSOVER_PICK_MATCHED_PROB: u64 = percent(50);

/// Probability of treating the left parent as fitter when fitness is tied
pub const ESPEON_CROSSOVER_PICK_LEQ_PROB: u64 = percent(50);

// ============================================================================
// Compatibility Coefficients
// ============================================================================

/// Coefficient for excess genes in compatibility distance calculation
pub const ESPEON_DELTA_EXCESS_COEFFICIENT: f64 = 1.0;

/// Coefficient for disjoint genes in compatibility distance calculation
pub const ESPEON_DELTA_DISJOINT_COEFFICIENT: f64 = 1.0;

/// Coefficient for weight differences in compatibility distance calculation
pub const ESPEON_DELTA_PARAM_COEFFICIENT: f64 = 0.4;

/// Genome size below which delta is not normalized by gene count
pub const ESPEON_DELTA_NORMALIZATION_THRESHOLD: f64 = 20.0;

// ============================================================================
// Working Buffers
// ============================================================================

/// Initial node capacity of cycle detector bitmaps
pub const ESPEON_BITMAP_INITIAL_CAPACITY: usize = 1024;
