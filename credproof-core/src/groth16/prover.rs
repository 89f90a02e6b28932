use ark_bn254::{G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_std::rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{
    data_structures::{Proof, ProvingKey},
    qap, sample_scalar,
};
use crate::{field::FieldElement, utils::errors::ProveError, witness::Witness};

fn msm_g1(bases: &[G1Affine], scalars: &[FieldElement]) -> G1Projective {
    let n = bases.len().min(scalars.len());
    G1Projective::msm_unchecked(&bases[..n], &scalars[..n])
}

fn msm_g2(bases: &[G2Affine], scalars: &[FieldElement]) -> G2Projective {
    let n = bases.len().min(scalars.len());
    G2Projective::msm_unchecked(&bases[..n], &scalars[..n])
}

/// Produces a zero-knowledge proof that `witness` satisfies the constraint system `pk` was
/// generated for.
///
/// The witness is consumed and wiped once the proof exists. Two calls with the same inputs
/// give different proofs because `r` and `s` are fresh each time.
#[tracing::instrument(skip_all, name = "groth16::prove")]
pub fn prove<R: RngCore + CryptoRng>(
    pk: &ProvingKey,
    witness: Witness,
    rng: &mut R,
) -> Result<Proof, ProveError> {
    let cs = pk.constraint_system();
    if witness.cs_digest() != pk.vk.cs_digest {
        return Err(ProveError::KeyMismatch);
    }
    if witness.len() != cs.num_columns() {
        return Err(ProveError::InvalidWitnessLength(
            cs.num_columns(),
            witness.len(),
        ));
    }
    let z = witness.assignment();

    let domain =
        qap::domain_for(cs).ok_or_else(|| ProveError::DomainTooLarge(qap::num_qap_rows(cs)))?;
    let h = qap::witness_map(cs, &domain, z)
        .ok_or_else(|| ProveError::DomainTooLarge(qap::num_qap_rows(cs)))?;

    let r = Zeroizing::new(
        sample_scalar(&mut *rng).map_err(|e| ProveError::Randomness(e.to_string()))?,
    );
    let s = Zeroizing::new(
        sample_scalar(&mut *rng).map_err(|e| ProveError::Randomness(e.to_string()))?,
    );

    let num_instance = cs.num_instance_columns();
    let aux = &z[num_instance..];

    let ((a_acc, b_g1_acc), (b_g2_acc, (l_acc, h_acc))) = rayon::join(
        || (msm_g1(&pk.a_query, z), msm_g1(&pk.b_g1_query, z)),
        || {
            rayon::join(
                || msm_g2(&pk.b_g2_query, z),
                || (msm_g1(&pk.l_query, aux), msm_g1(&pk.h_query, &h)),
            )
        },
    );

    let delta_g1 = pk.delta_g1.into_group();
    let g_a = pk.vk.alpha_g1.into_group() + a_acc + delta_g1 * *r;
    let g_b = pk.vk.beta_g2.into_group() + b_g2_acc + pk.vk.delta_g2.into_group() * *s;
    let g1_b = pk.beta_g1.into_group() + b_g1_acc + delta_g1 * *s;
    let rs = Zeroizing::new(*r * *s);
    let g_c = l_acc + h_acc + g_a * *s + g1_b * *r - delta_g1 * *rs;

    drop(witness);
    tracing::debug!("proof assembled");

    Ok(Proof {
        a: g_a.into_affine(),
        b: g_b.into_affine(),
        c: g_c.into_affine(),
    })
}
