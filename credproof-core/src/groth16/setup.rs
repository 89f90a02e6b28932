use ark_bn254::{G1Affine, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Field;
use ark_poly::EvaluationDomain;
use ark_std::{
    rand::{CryptoRng, RngCore},
    Zero,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{
    batch_mul,
    data_structures::{ProvingKey, VerifyingKey},
    qap, sample_scalar,
};
use crate::{field::FieldElement, r1cs::ConstraintSystem, utils::errors::SetupError};

/// The setup trapdoor. Anyone holding it can forge proofs, so it only ever lives inside
/// [`setup`] and is wiped on every exit path.
#[derive(Zeroize, ZeroizeOnDrop)]
struct ToxicWaste {
    tau: FieldElement,
    alpha: FieldElement,
    beta: FieldElement,
    gamma: FieldElement,
    delta: FieldElement,
}

impl ToxicWaste {
    fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, SetupError> {
        let mut draw =
            || sample_scalar(&mut *rng).map_err(|e| SetupError::Randomness(e.to_string()));
        let waste = Self {
            tau: draw()?,
            alpha: draw()?,
            beta: draw()?,
            gamma: draw()?,
            delta: draw()?,
        };
        if waste.gamma.is_zero() || waste.delta.is_zero() {
            return Err(SetupError::Randomness(
                "sampled a zero trapdoor element".to_string(),
            ));
        }
        Ok(waste)
    }
}

/// Circuit-specific Groth16 setup.
///
/// A failed call may be retried with fresh randomness; the same inputs and the same random
/// stream reproduce the same keys.
#[tracing::instrument(skip_all, name = "groth16::setup")]
pub fn setup<R: RngCore + CryptoRng>(
    cs: &ConstraintSystem,
    rng: &mut R,
) -> Result<(ProvingKey, VerifyingKey), SetupError> {
    if cs.num_constraints() == 0 {
        return Err(SetupError::Degenerate("no constraints"));
    }
    if cs.num_public() == 0 {
        return Err(SetupError::Degenerate("no public inputs"));
    }
    let domain =
        qap::domain_for(cs).ok_or_else(|| SetupError::DomainTooLarge(qap::num_qap_rows(cs)))?;
    tracing::debug!(
        constraints = cs.num_constraints(),
        domain_size = domain.size(),
        "running setup"
    );

    let waste = ToxicWaste::sample(rng)?;
    let evals = qap::evaluate_at(cs, &domain, waste.tau);
    if evals.zt.is_zero() {
        return Err(SetupError::Randomness(
            "tau landed on the evaluation domain".to_string(),
        ));
    }

    let gamma_inverse = Zeroizing::new(waste.gamma.inverse().ok_or_else(|| {
        SetupError::Randomness("sampled a zero trapdoor element".to_string())
    })?);
    let delta_inverse = Zeroizing::new(waste.delta.inverse().ok_or_else(|| {
        SetupError::Randomness("sampled a zero trapdoor element".to_string())
    })?);

    let num_instance = cs.num_instance_columns();
    let combined = |j: usize| waste.beta * evals.a[j] + waste.alpha * evals.b[j] + evals.c[j];
    let gamma_abc = Zeroizing::new(
        (0..num_instance)
            .map(|j| combined(j) * *gamma_inverse)
            .collect::<Vec<_>>(),
    );
    let l = Zeroizing::new(
        (num_instance..cs.num_columns())
            .map(|j| combined(j) * *delta_inverse)
            .collect::<Vec<_>>(),
    );

    // H has degree at most domain_size - 2.
    let zt_over_delta = evals.zt * *delta_inverse;
    let mut h_scalars = Zeroizing::new(Vec::with_capacity(domain.size() - 1));
    let mut power = zt_over_delta;
    for _ in 0..domain.size() - 1 {
        h_scalars.push(power);
        power *= waste.tau;
    }
    power.zeroize();

    let g1 = G1Affine::generator().into_group();
    let g2 = G2Affine::generator().into_group();

    let a_query = batch_mul(g1, &evals.a);
    let b_g1_query = batch_mul(g1, &evals.b);
    let b_g2_query = batch_mul(g2, &evals.b);
    let h_query = batch_mul(g1, &h_scalars);
    let l_query = batch_mul(g1, &l);
    let gamma_abc_g1 = batch_mul(g1, &gamma_abc);

    let vk = VerifyingKey {
        alpha_g1: (g1 * waste.alpha).into_affine(),
        beta_g2: (g2 * waste.beta).into_affine(),
        gamma_g2: (g2 * waste.gamma).into_affine(),
        delta_g2: (g2 * waste.delta).into_affine(),
        gamma_abc_g1,
        cs_digest: cs.digest(),
    };
    let pk = ProvingKey {
        vk: vk.clone(),
        beta_g1: (g1 * waste.beta).into_affine(),
        delta_g1: (g1 * waste.delta).into_affine(),
        a_query,
        b_g1_query,
        b_g2_query,
        h_query,
        l_query,
        cs: cs.clone(),
    };
    drop(waste);

    Ok((pk, vk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r1cs::{R1CSBuilder, VariableKind};
    use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};

    fn square() -> ConstraintSystem {
        let mut builder = R1CSBuilder::new();
        let x = builder.declare(VariableKind::Secret);
        let y = builder.declare(VariableKind::Public);
        let sq = builder.mul(x, x);
        builder.constrain_eq(sq, y);
        builder.build().unwrap()
    }

    /// An RNG whose every draw fails.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0)
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), ark_std::rand::Error> {
            Err(ark_std::rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn key_shapes() {
        let cs = square();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (pk, vk) = setup(&cs, &mut rng).unwrap();
        let domain = qap::domain_for(&cs).unwrap();
        assert_eq!(vk.gamma_abc_g1.len(), cs.num_instance_columns());
        assert_eq!(vk.num_public_inputs(), 1);
        assert_eq!(pk.a_query.len(), cs.num_columns());
        assert_eq!(pk.b_g2_query.len(), cs.num_columns());
        assert_eq!(pk.l_query.len(), cs.num_witness_columns());
        assert_eq!(pk.h_query.len(), domain.size() - 1);
        assert_eq!(pk.vk, vk);
        assert_eq!(vk.cs_digest, cs.digest());
    }

    #[test]
    fn same_seed_same_keys() {
        let cs = square();
        let (_, vk1) = setup(&cs, &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let (_, vk2) = setup(&cs, &mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let (_, vk3) = setup(&cs, &mut ChaCha20Rng::seed_from_u64(8)).unwrap();
        assert_eq!(vk1, vk2);
        assert_ne!(vk1, vk3);
    }

    #[test]
    fn degenerate_systems_are_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let empty = R1CSBuilder::new().build().unwrap();
        assert_eq!(
            setup(&empty, &mut rng).unwrap_err(),
            SetupError::Degenerate("no constraints")
        );

        let mut builder = R1CSBuilder::new();
        let x = builder.declare(VariableKind::Secret);
        builder.mul(x, x);
        let private_only = builder.build().unwrap();
        assert_eq!(
            setup(&private_only, &mut rng).unwrap_err(),
            SetupError::Degenerate("no public inputs")
        );
    }

    #[test]
    fn randomness_failure_is_reported() {
        let cs = square();
        assert!(matches!(
            setup(&cs, &mut BrokenRng),
            Err(SetupError::Randomness(_))
        ));
    }
}
