//! Groth16 over BN254.
//!
//! [`setup`] turns a [`ConstraintSystem`](crate::r1cs::ConstraintSystem) into a key pair,
//! [`prove`] consumes a satisfying [`Witness`](crate::witness::Witness), and [`verify`] checks
//! a proof against the public inputs with three pairings, independent of circuit size.
//!
//! The QAP reduction adds one row per instance column (`A = x_i`, `B = C = 0`) so that the
//! public-input polynomials are linearly independent.

pub mod data_structures;
pub mod prover;
pub mod qap;
pub mod setup;
pub mod verifier;

pub use data_structures::{PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
pub use prover::prove;
pub use setup::setup;
pub use verifier::{prepare_verifying_key, verify, verify_with_prepared};

use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use ark_std::rand::RngCore;
use rayon::prelude::*;
use zeroize::Zeroizing;

use crate::field::FieldElement;

/// Draws a uniform scalar from 512 bits of randomness. Fails only if the source does.
pub(crate) fn sample_scalar<R: RngCore + ?Sized>(
    rng: &mut R,
) -> Result<FieldElement, ark_std::rand::Error> {
    let mut buf = Zeroizing::new([0u8; 64]);
    rng.try_fill_bytes(&mut buf[..])?;
    Ok(FieldElement::from_le_bytes_mod_order(&buf[..]))
}

/// `[base * s for s in scalars]`, normalized to affine.
pub(crate) fn batch_mul<G: CurveGroup>(base: G, scalars: &[G::ScalarField]) -> Vec<G::Affine> {
    let projective: Vec<G> = scalars.par_iter().map(|s| base * *s).collect();
    G::normalize_batch(&projective)
}
