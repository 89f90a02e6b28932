use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::gadgets::mimc::{DEFAULT_ROUNDS, DEFAULT_SEED};

/// Parameters that fix the shape of the credential circuit and MUST match between prover and
/// verifier. The round constants they produce end up as matrix coefficients, so any
/// disagreement changes the constraint-system digest.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CircuitConfig {
    /// Nonlinear rounds applied after each absorbed attribute.
    pub mimc_rounds: usize,
    /// Label the round-constant hash chain starts from.
    pub mimc_seed: String,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            mimc_rounds: DEFAULT_ROUNDS,
            mimc_seed: DEFAULT_SEED.to_string(),
        }
    }
}

impl CircuitConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.mimc_rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.mimc_seed = seed.into();
        self
    }
}
