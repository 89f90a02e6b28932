use ark_bn254::{Bn254, G1Affine, G2Affine};
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::r1cs::ConstraintSystem;

/// A Groth16 proof: two G1 points and one G2 point, whatever the circuit size.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof {
    pub a: G1Affine,
    pub b: G2Affine,
    pub c: G1Affine,
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingKey {
    pub alpha_g1: G1Affine,
    pub beta_g2: G2Affine,
    pub gamma_g2: G2Affine,
    pub delta_g2: G2Affine,
    /// `[(beta*A_i(tau) + alpha*B_i(tau) + C_i(tau)) / gamma]` for the constant wire and
    /// each public input, in declaration order.
    pub gamma_abc_g1: Vec<G1Affine>,
    /// Digest of the constraint system the key was derived from.
    pub cs_digest: [u8; 32],
}

impl VerifyingKey {
    pub fn num_public_inputs(&self) -> usize {
        self.gamma_abc_g1.len().saturating_sub(1)
    }
}

#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProvingKey {
    pub vk: VerifyingKey,
    pub beta_g1: G1Affine,
    pub delta_g1: G1Affine,
    /// `A_i(tau)` for every column.
    pub a_query: Vec<G1Affine>,
    /// `B_i(tau)` for every column.
    pub b_g1_query: Vec<G1Affine>,
    pub b_g2_query: Vec<G2Affine>,
    /// `tau^i * Z(tau) / delta` for `i < domain_size - 1`.
    pub h_query: Vec<G1Affine>,
    /// `(beta*A_i(tau) + alpha*B_i(tau) + C_i(tau)) / delta` for every witness column.
    pub l_query: Vec<G1Affine>,
    /// The proving side needs the matrices to compute the quotient polynomial.
    pub cs: ConstraintSystem,
}

impl ProvingKey {
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.vk
    }

    pub fn constraint_system(&self) -> &ConstraintSystem {
        &self.cs
    }
}

/// A verifying key with the pairing-side precomputation done once.
#[derive(Clone)]
pub struct PreparedVerifyingKey {
    pub vk: VerifyingKey,
    pub alpha_g1_beta_g2: PairingOutput<Bn254>,
    pub gamma_g2_neg_pc: <Bn254 as Pairing>::G2Prepared,
    pub delta_g2_neg_pc: <Bn254 as Pairing>::G2Prepared,
}

impl From<VerifyingKey> for PreparedVerifyingKey {
    fn from(vk: VerifyingKey) -> Self {
        super::verifier::prepare_verifying_key(&vk)
    }
}
