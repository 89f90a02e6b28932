use ark_bn254::{Bn254, G1Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};

use super::data_structures::{PreparedVerifyingKey, Proof, VerifyingKey};
use crate::field::FieldElement;

pub fn prepare_verifying_key(vk: &VerifyingKey) -> PreparedVerifyingKey {
    PreparedVerifyingKey {
        vk: vk.clone(),
        alpha_g1_beta_g2: Bn254::pairing(vk.alpha_g1, vk.beta_g2),
        gamma_g2_neg_pc: (-vk.gamma_g2.into_group()).into_affine().into(),
        delta_g2_neg_pc: (-vk.delta_g2.into_group()).into_affine().into(),
    }
}

/// Checks `proof` against `public_inputs` (`[hash, expected]` for the credential circuit).
///
/// Returns `false` for a bad proof and for an input vector of the wrong length; it never
/// errors and never reveals which check failed.
pub fn verify(vk: &VerifyingKey, public_inputs: &[FieldElement], proof: &Proof) -> bool {
    verify_with_prepared(&prepare_verifying_key(vk), public_inputs, proof)
}

#[tracing::instrument(skip_all, name = "groth16::verify")]
pub fn verify_with_prepared(
    pvk: &PreparedVerifyingKey,
    public_inputs: &[FieldElement],
    proof: &Proof,
) -> bool {
    let gamma_abc = &pvk.vk.gamma_abc_g1;
    if public_inputs.len() + 1 != gamma_abc.len() {
        tracing::debug!(
            expected = gamma_abc.len().saturating_sub(1),
            actual = public_inputs.len(),
            "wrong number of public inputs"
        );
        return false;
    }

    let mut acc: G1Projective = gamma_abc[0].into_group();
    for (input, base) in public_inputs.iter().zip(&gamma_abc[1..]) {
        acc += *base * input;
    }

    let g1 = [
        <Bn254 as Pairing>::G1Prepared::from(proof.a),
        acc.into_affine().into(),
        proof.c.into(),
    ];
    let g2 = [
        <Bn254 as Pairing>::G2Prepared::from(proof.b),
        pvk.gamma_g2_neg_pc.clone(),
        pvk.delta_g2_neg_pc.clone(),
    ];
    let miller = Bn254::multi_miller_loop(g1, g2);
    match Bn254::final_exponentiation(miller) {
        Some(result) => result == pvk.alpha_g1_beta_g2,
        None => false,
    }
}
