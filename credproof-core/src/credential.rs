use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    circuit::CircuitShape,
    field::{encode_attribute, FieldElement},
    gadgets::mimc::MimcParams,
    r1cs::ConstraintSystem,
    utils::errors::{EncodingError, WitnessError},
    witness::{assign, Witness},
};

/// The values a verifier sees, in protocol order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PublicInputs {
    pub hash: FieldElement,
    pub expected: FieldElement,
}

impl PublicInputs {
    pub fn to_vec(&self) -> Vec<FieldElement> {
        vec![self.hash, self.expected]
    }
}

/// Secret attributes plus the public claim about them. Wiped on drop, and consumed when
/// turned into a witness.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CredentialRecord {
    attributes: Vec<FieldElement>,
    #[zeroize(skip)]
    public: PublicInputs,
}

impl CredentialRecord {
    pub fn new(attributes: Vec<FieldElement>, public: PublicInputs) -> Self {
        Self { attributes, public }
    }

    /// Encodes textual attributes and derives the honest claim: the hash of all attributes and
    /// the value of the disclosed one.
    pub fn from_attributes(
        attributes: &[&str],
        shape: &CircuitShape,
    ) -> Result<Self, EncodingError> {
        let encoded = attributes
            .iter()
            .map(|a| encode_attribute(a))
            .collect::<Result<Vec<_>, _>>()?;
        let params = MimcParams::new(&shape.config);
        let hash = params.hash(&encoded);
        let expected = encoded
            .get(shape.disclosed_attribute)
            .copied()
            .unwrap_or_default();
        Ok(Self::new(encoded, PublicInputs { hash, expected }))
    }

    /// Replaces the claimed disclosed value, e.g. with one supplied by a verifier.
    pub fn with_expected(mut self, expected: FieldElement) -> Self {
        self.public.expected = expected;
        self
    }

    pub fn with_hash(mut self, hash: FieldElement) -> Self {
        self.public.hash = hash;
        self
    }

    pub fn public_inputs(&self) -> PublicInputs {
        self.public
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Builds the witness. The record is dropped (and wiped) when this returns.
    pub fn into_witness(self, cs: &ConstraintSystem) -> Result<Witness, WitnessError> {
        assign_witness(cs, &self.attributes, self.public.hash, self.public.expected)
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("num_attributes", &self.attributes.len())
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Assigns the credential circuit. Public inputs are laid out as `[public_hash, public_expected]`.
pub fn assign_witness(
    cs: &ConstraintSystem,
    secret: &[FieldElement],
    public_hash: FieldElement,
    public_expected: FieldElement,
) -> Result<Witness, WitnessError> {
    assign(cs, &[public_hash, public_expected], secret)
}
