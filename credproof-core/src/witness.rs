use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    field::FieldElement,
    r1cs::{constraint_system::evaluate_row, ConstraintSystem},
    utils::errors::WitnessError,
};

/// Full assignment `[1, public..., secret..., internal...]` for one constraint system.
///
/// Holds the secret attributes, so it is wiped on drop. Proving consumes it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Witness {
    cs_digest: [u8; 32],
    num_instance: usize,
    assignment: Vec<FieldElement>,
}

impl Witness {
    /// Digest of the constraint system this witness satisfies.
    pub fn cs_digest(&self) -> [u8; 32] {
        self.cs_digest
    }

    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    pub fn public_inputs(&self) -> &[FieldElement] {
        &self.assignment[1..self.num_instance]
    }

    pub(crate) fn assignment(&self) -> &[FieldElement] {
        &self.assignment
    }
}

impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Witness")
            .field("num_instance", &self.num_instance)
            .field("len", &self.assignment.len())
            .finish_non_exhaustive()
    }
}

/// Evaluates every internal wire from the public and secret values, then checks every
/// constraint. Only satisfying assignments are returned.
#[tracing::instrument(skip_all, name = "witness::assign")]
pub fn assign(
    cs: &ConstraintSystem,
    public: &[FieldElement],
    secret: &[FieldElement],
) -> Result<Witness, WitnessError> {
    if public.len() != cs.num_public() {
        return Err(WitnessError::InvalidPublicLength {
            expected: cs.num_public(),
            actual: public.len(),
        });
    }
    if secret.len() != cs.num_secret() {
        return Err(WitnessError::InvalidSecretLength {
            expected: cs.num_secret(),
            actual: secret.len(),
        });
    }

    // Sized up front so the secret-bearing buffer never reallocates and leaves copies behind.
    let mut witness = Witness {
        cs_digest: cs.digest(),
        num_instance: cs.num_instance_columns(),
        assignment: Vec::with_capacity(cs.num_columns()),
    };
    witness.assignment.push(FieldElement::from(1u64));
    witness.assignment.extend_from_slice(public);
    witness.assignment.extend_from_slice(secret);
    for derivation in cs.derivations() {
        let a = evaluate_row(&derivation.a, &witness.assignment);
        let b = evaluate_row(&derivation.b, &witness.assignment);
        witness.assignment.push(a * b);
    }

    if let Some(index) = cs.first_unsatisfied(&witness.assignment) {
        tracing::debug!(index, "witness does not satisfy the constraint system");
        return Err(WitnessError::ConstraintUnsatisfied { index });
    }
    Ok(witness)
}
