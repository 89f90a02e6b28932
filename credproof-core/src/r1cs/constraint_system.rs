use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, Read, SerializationError, Valid, Validate,
};
use ark_std::Zero;
use rayon::prelude::*;
use sha3::{Digest, Sha3_256};

use crate::field::FieldElement;

/// (coeff, column) pairs of a single matrix row.
pub type SparseRow = Vec<(FieldElement, usize)>;

pub fn evaluate_row(row: &[(FieldElement, usize)], assignment: &[FieldElement]) -> FieldElement {
    row.iter()
        .fold(FieldElement::zero(), |acc, (coeff, col)| acc + *coeff * assignment[*col])
}

/// How an internal wire gets its value: `(a·z) * (b·z)`.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Derivation {
    pub a: SparseRow,
    pub b: SparseRow,
}

/// An immutable rank-1 constraint system.
///
/// Columns of the full assignment vector are laid out as
/// `[1, public..., secret..., internal...]`, each group in declaration order. A witness is
/// valid iff `(A_i·z) * (B_i·z) == C_i·z` for every row `i`.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize)]
pub struct ConstraintSystem {
    pub(crate) num_public: usize,
    pub(crate) num_secret: usize,
    pub(crate) num_internal: usize,
    pub(crate) a: Vec<SparseRow>,
    pub(crate) b: Vec<SparseRow>,
    pub(crate) c: Vec<SparseRow>,
    /// One entry per internal wire, in column order.
    pub(crate) derivations: Vec<Derivation>,
    pub(crate) digest: [u8; 32],
}

impl ConstraintSystem {
    pub(crate) fn from_parts(
        num_public: usize,
        num_secret: usize,
        num_internal: usize,
        a: Vec<SparseRow>,
        b: Vec<SparseRow>,
        c: Vec<SparseRow>,
        derivations: Vec<Derivation>,
    ) -> Self {
        let mut cs = Self {
            num_public,
            num_secret,
            num_internal,
            a,
            b,
            c,
            derivations,
            digest: [0u8; 32],
        };
        cs.digest = cs.compute_digest();
        cs
    }

    /// SHA3-256 over the canonical encoding of everything except the digest itself.
    pub fn compute_digest(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        let mut bytes = Vec::new();
        // Serializing into a Vec cannot fail.
        let _ = (
            self.num_public,
            self.num_secret,
            self.num_internal,
        )
            .serialize_compressed(&mut bytes);
        let _ = self.a.serialize_compressed(&mut bytes);
        let _ = self.b.serialize_compressed(&mut bytes);
        let _ = self.c.serialize_compressed(&mut bytes);
        let _ = self.derivations.serialize_compressed(&mut bytes);
        hasher.update(bytes);
        hasher.finalize().into()
    }

    /// Identifies this system. Keys and witnesses carry it so mismatches are caught.
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    pub fn num_constraints(&self) -> usize {
        self.a.len()
    }

    pub fn num_public(&self) -> usize {
        self.num_public
    }

    pub fn num_secret(&self) -> usize {
        self.num_secret
    }

    pub fn num_internal(&self) -> usize {
        self.num_internal
    }

    /// Constant wire plus public wires.
    pub fn num_instance_columns(&self) -> usize {
        1 + self.num_public
    }

    pub fn num_witness_columns(&self) -> usize {
        self.num_secret + self.num_internal
    }

    pub fn num_columns(&self) -> usize {
        self.num_instance_columns() + self.num_witness_columns()
    }

    pub fn first_secret_column(&self) -> usize {
        self.num_instance_columns()
    }

    pub fn first_internal_column(&self) -> usize {
        self.num_instance_columns() + self.num_secret
    }

    pub fn rows(&self) -> impl Iterator<Item = (&SparseRow, &SparseRow, &SparseRow)> {
        self.a.iter().zip(self.b.iter()).zip(self.c.iter()).map(|((a, b), c)| (a, b, c))
    }

    pub fn derivations(&self) -> &[Derivation] {
        &self.derivations
    }

    /// Returns the index of the first violated row, if any. An assignment of the wrong length
    /// satisfies nothing and reports row 0.
    #[tracing::instrument(skip_all, name = "ConstraintSystem::first_unsatisfied")]
    pub fn first_unsatisfied(&self, assignment: &[FieldElement]) -> Option<usize> {
        if assignment.len() != self.num_columns() {
            return Some(0);
        }
        (0..self.num_constraints()).into_par_iter().find_first(|&i| {
            let a = evaluate_row(&self.a[i], assignment);
            let b = evaluate_row(&self.b[i], assignment);
            let c = evaluate_row(&self.c[i], assignment);
            a * b != c
        })
    }

    pub fn is_satisfied(&self, assignment: &[FieldElement]) -> bool {
        self.first_unsatisfied(assignment).is_none()
    }
}

impl Valid for ConstraintSystem {
    /// Every column index is in range, each derivation reads only wires assigned before it,
    /// and the stored digest matches the contents.
    fn check(&self) -> Result<(), SerializationError> {
        let num_columns = self.num_columns();
        if self.b.len() != self.a.len()
            || self.c.len() != self.a.len()
            || self.derivations.len() != self.num_internal
        {
            return Err(SerializationError::InvalidData);
        }
        let in_range = |row: &SparseRow, bound: usize| row.iter().all(|(_, col)| *col < bound);
        if !self
            .a
            .iter()
            .chain(&self.b)
            .chain(&self.c)
            .all(|row| in_range(row, num_columns))
        {
            return Err(SerializationError::InvalidData);
        }
        let first_internal = self.first_internal_column();
        for (index, derivation) in self.derivations.iter().enumerate() {
            let own_column = first_internal + index;
            if !in_range(&derivation.a, own_column) || !in_range(&derivation.b, own_column) {
                return Err(SerializationError::InvalidData);
            }
        }
        if self.compute_digest() != self.digest {
            return Err(SerializationError::InvalidData);
        }
        Ok(())
    }
}

impl CanonicalDeserialize for ConstraintSystem {
    fn deserialize_with_mode<R: Read>(
        mut reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let cs = Self {
            num_public: usize::deserialize_with_mode(&mut reader, compress, validate)?,
            num_secret: usize::deserialize_with_mode(&mut reader, compress, validate)?,
            num_internal: usize::deserialize_with_mode(&mut reader, compress, validate)?,
            a: Vec::deserialize_with_mode(&mut reader, compress, validate)?,
            b: Vec::deserialize_with_mode(&mut reader, compress, validate)?,
            c: Vec::deserialize_with_mode(&mut reader, compress, validate)?,
            derivations: Vec::deserialize_with_mode(&mut reader, compress, validate)?,
            digest: <[u8; 32]>::deserialize_with_mode(&mut reader, compress, validate)?,
        };
        if let Validate::Yes = validate {
            cs.check()?;
        }
        Ok(cs)
    }
}
