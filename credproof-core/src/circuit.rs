//! The credential predicate:
//!
//! ```text
//! secret[disclosed] == expected  AND  mimc(secret[0], ..., secret[n-1]) == hash
//! ```
//!
//! Public inputs are `[hash, expected]`, in that order.

use crate::{
    config::CircuitConfig,
    gadgets::mimc::MimcParams,
    r1cs::{ConstraintSystem, R1CSBuilder, VariableKind},
    utils::errors::CompileError,
};

pub const NUM_ATTRIBUTES: usize = 4;

/// Index of the attribute whose value is disclosed through a public input.
pub const DISCLOSED_ATTRIBUTE: usize = 1;

/// Roles of every wire the credential circuit declares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitShape {
    pub num_attributes: usize,
    pub disclosed_attribute: usize,
    pub config: CircuitConfig,
}

impl Default for CircuitShape {
    fn default() -> Self {
        Self {
            num_attributes: NUM_ATTRIBUTES,
            disclosed_attribute: DISCLOSED_ATTRIBUTE,
            config: CircuitConfig::default(),
        }
    }
}

impl CircuitShape {
    pub fn with_config(config: CircuitConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn num_public_inputs(&self) -> usize {
        2
    }
}

/// Lowers the credential predicate to R1CS.
#[tracing::instrument(skip_all, name = "circuit::compile")]
pub fn compile(shape: &CircuitShape) -> Result<ConstraintSystem, CompileError> {
    if shape.num_attributes == 0 {
        return Err(CompileError::InvalidShape(
            "credential needs at least one attribute".to_string(),
        ));
    }
    if shape.disclosed_attribute >= shape.num_attributes {
        return Err(CompileError::InvalidShape(format!(
            "disclosed attribute {} out of range for {} attributes",
            shape.disclosed_attribute, shape.num_attributes
        )));
    }
    let params = MimcParams::new(&shape.config);

    let mut builder = R1CSBuilder::new();
    let secrets: Vec<_> = (0..shape.num_attributes)
        .map(|_| builder.declare(VariableKind::Secret))
        .collect();
    let public_hash = builder.declare(VariableKind::Public);
    let expected = builder.declare(VariableKind::Public);

    builder.assert_equal(secrets[shape.disclosed_attribute], expected);
    let digest = params.hash_gadget(&mut builder, &secrets)?;
    builder.assert_equal(digest, public_hash);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::FieldElement, gadgets::mimc::CONSTRAINTS_PER_ROUND, witness::assign};

    fn small_shape() -> CircuitShape {
        CircuitShape::with_config(CircuitConfig::default().with_rounds(5))
    }

    #[test]
    fn default_shape_sizes() {
        let shape = CircuitShape::default();
        let cs = compile(&shape).unwrap();
        assert_eq!(cs.num_public(), 2);
        assert_eq!(cs.num_secret(), NUM_ATTRIBUTES);
        assert_eq!(
            cs.num_constraints(),
            2 + NUM_ATTRIBUTES * shape.config.mimc_rounds * CONSTRAINTS_PER_ROUND
        );
        assert_eq!(cs.num_internal(), cs.num_constraints() - 2);
    }

    #[test]
    fn compile_is_reproducible() {
        assert_eq!(
            compile(&small_shape()).unwrap().digest(),
            compile(&small_shape()).unwrap().digest()
        );
        let reseeded = CircuitShape::with_config(
            CircuitConfig::default().with_rounds(5).with_seed("other"),
        );
        assert_ne!(
            compile(&small_shape()).unwrap().digest(),
            compile(&reseeded).unwrap().digest()
        );
    }

    #[test]
    fn rejects_bad_shapes() {
        let mut shape = small_shape();
        shape.disclosed_attribute = 4;
        assert!(matches!(compile(&shape), Err(CompileError::InvalidShape(_))));
        shape.num_attributes = 0;
        assert!(matches!(compile(&shape), Err(CompileError::InvalidShape(_))));
        let no_rounds = CircuitShape::with_config(CircuitConfig::default().with_rounds(0));
        assert!(matches!(compile(&no_rounds), Err(CompileError::InvalidShape(_))));
    }

    #[test]
    fn predicate_accepts_and_rejects() {
        let shape = small_shape();
        let cs = compile(&shape).unwrap();
        let params = MimcParams::new(&shape.config);
        let secrets: Vec<FieldElement> = (10..14u64).map(FieldElement::from).collect();
        let hash = params.hash(&secrets);

        assert!(assign(&cs, &[hash, secrets[1]], &secrets).is_ok());
        // Wrong disclosed value trips the first row.
        assert!(assign(&cs, &[hash, secrets[2]], &secrets).is_err());
        // Wrong hash trips the last row.
        let err = assign(&cs, &[hash + FieldElement::from(1u64), secrets[1]], &secrets)
            .unwrap_err();
        assert_eq!(
            err,
            crate::utils::errors::WitnessError::ConstraintUnsatisfied {
                index: cs.num_constraints() - 1
            }
        );
    }
}
