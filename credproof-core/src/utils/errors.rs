use thiserror::Error;

/// Structural misuse of the constraint builder. Never caused by data values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Variable {0} was not declared by this builder")]
    UndeclaredVariable(String),
    #[error("Internal variable {0} has no derivation")]
    UnderivedVariable(usize),
    #[error("Internal variable {0} is derived more than once")]
    DuplicateDerivation(usize),
    #[error("Circuit shape is invalid: {0}")]
    InvalidShape(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("Degenerate constraint system: {0}")]
    Degenerate(&'static str),
    #[error("Randomness source failure: {0}")]
    Randomness(String),
    #[error("Constraint system too large for an evaluation domain of {0} rows")]
    DomainTooLarge(usize),
}

/// Failure to produce a satisfying assignment. `ConstraintUnsatisfied` means the credential
/// does not match the claim; it is not a system fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error("Constraint {index} is not satisfied by the supplied values")]
    ConstraintUnsatisfied { index: usize },
    #[error("Expected {expected} secret values but got {actual}")]
    InvalidSecretLength { expected: usize, actual: usize },
    #[error("Expected {expected} public values but got {actual}")]
    InvalidPublicLength { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProveError {
    #[error("Witness was assigned for a different constraint system than the proving key")]
    KeyMismatch,
    #[error("Invalid witness length, expected length {0} but got {1}")]
    InvalidWitnessLength(usize, usize),
    #[error("Randomness source failure: {0}")]
    Randomness(String),
    #[error("Constraint system too large for an evaluation domain of {0} rows")]
    DomainTooLarge(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Attribute is {0} bytes long; at most {1} bytes fit in a field element")]
    AttributeTooLong(usize, usize),
    #[error("Invalid hex field element: {0}")]
    InvalidHex(String),
}

pub use ark_serialize::SerializationError;
