//! MiMC hash over the BN254 scalar field in Miyaguchi-Preneel mode.
//!
//! The block cipher `E_k(x)` applies `rounds` rounds of `x -> (x + k + c_r)^5` and adds the key
//! once more at the end. Because `gcd(5, r - 1) = 1` for the BN254 scalar modulus, every round
//! is a permutation of `x`. The chaining value starts at zero and each input `m` updates it as
//! `h' = E_h(m) + h + m`. The feed-forward keeps the compression function from being inverted
//! by running the rounds backwards.
//!
//! Round constants are a SHA3-256 hash chain: `h_0 = SHA3(seed)`, `h_{r+1} = SHA3(h_r)`, and
//! `c_r` is `h_{r+1}` read big-endian and reduced.

use ark_ff::{Field, PrimeField};
use ark_std::Zero;
use sha3::{Digest, Sha3_256};

use crate::{
    config::CircuitConfig,
    field::FieldElement,
    r1cs::{R1CSBuilder, Variable, LC},
    utils::errors::CompileError,
};

/// S-box exponent.
pub const MIMC_EXPONENT: u64 = 5;

/// ceil(log_5(r)) for the 254-bit BN254 scalar modulus.
pub const DEFAULT_ROUNDS: usize = 110;

pub const DEFAULT_SEED: &str = "credproof.mimc.bn254";

/// Multiplication constraints per round (`sq = t*t`, `quad = sq*sq`, `out = quad*t`).
pub const CONSTRAINTS_PER_ROUND: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct MimcParams {
    round_constants: Vec<FieldElement>,
}

impl MimcParams {
    pub fn new(config: &CircuitConfig) -> Self {
        Self::from_seed(config.mimc_seed.as_bytes(), config.mimc_rounds)
    }

    pub fn from_seed(seed: &[u8], rounds: usize) -> Self {
        let mut state: [u8; 32] = Sha3_256::digest(seed).into();
        let round_constants = (0..rounds)
            .map(|_| {
                state = Sha3_256::digest(state).into();
                FieldElement::from_be_bytes_mod_order(&state)
            })
            .collect();
        Self { round_constants }
    }

    pub fn rounds(&self) -> usize {
        self.round_constants.len()
    }

    pub fn round_constants(&self) -> &[FieldElement] {
        &self.round_constants
    }

    /// `E_key(message)`.
    pub fn encrypt(&self, key: FieldElement, message: FieldElement) -> FieldElement {
        let mut x = message;
        for constant in &self.round_constants {
            let t = x + key + constant;
            x = t.square().square() * t;
        }
        x + key
    }

    /// Native evaluation; agrees with [`Self::hash_gadget`] on every input.
    pub fn hash(&self, inputs: &[FieldElement]) -> FieldElement {
        inputs.iter().fold(FieldElement::zero(), |h, m| {
            self.encrypt(h, *m) + h + m
        })
    }

    /// Emits the hash of `inputs` as constraints and returns the final chaining value. The
    /// key additions and the feed-forward are linear, so each round costs
    /// [`CONSTRAINTS_PER_ROUND`] rows and nothing else does.
    pub fn hash_gadget(
        &self,
        builder: &mut R1CSBuilder,
        inputs: &[Variable],
    ) -> Result<LC, CompileError> {
        if self.round_constants.is_empty() {
            return Err(CompileError::InvalidShape(
                "hash needs at least one round".to_string(),
            ));
        }
        if inputs.is_empty() {
            return Err(CompileError::InvalidShape(
                "hash needs at least one input".to_string(),
            ));
        }
        let mut h = LC::zero();
        for input in inputs {
            let mut x = LC::from(*input);
            for constant in &self.round_constants {
                let t = x + h.clone() + *constant;
                let sq = builder.mul(t.clone(), t.clone());
                let quad = builder.mul(sq, sq);
                x = builder.mul(quad, t).into();
            }
            // E_h(m) + h + m, with E_h ending in its own `+ h`.
            h = x + h.clone() + h + *input;
        }
        Ok(h)
    }

    pub fn constraint_count(&self, num_inputs: usize) -> usize {
        num_inputs * self.rounds() * CONSTRAINTS_PER_ROUND
    }
}

impl Default for MimcParams {
    fn default() -> Self {
        Self::new(&CircuitConfig::default())
    }
}
