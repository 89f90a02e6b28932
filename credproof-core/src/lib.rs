//! Selective disclosure of one credential attribute with a Groth16 proof over BN254.
//!
//! A holder with four attributes proves that the attributes hash to a public commitment and
//! that one of them equals a publicly claimed value, without revealing the other three. The
//! pipeline is
//!
//! 1. [`circuit::compile`] the statement into a [`ConstraintSystem`],
//! 2. [`groth16::setup`] a key pair for it,
//! 3. [`credential::assign_witness`] (or [`CredentialRecord::into_witness`]) from the secret
//!    attributes and the public claim,
//! 4. [`groth16::prove`], and
//! 5. [`groth16::verify`] against `[hash, expected]`.

pub mod circuit;
pub mod config;
pub mod credential;
pub mod field;
pub mod gadgets;
pub mod groth16;
pub mod r1cs;
pub mod serialization;
pub mod utils;
pub mod witness;

pub use circuit::{compile, CircuitShape};
pub use config::CircuitConfig;
pub use credential::{assign_witness, CredentialRecord, PublicInputs};
pub use field::FieldElement;
pub use groth16::{prove, setup, verify, Proof, ProvingKey, VerifyingKey};
pub use r1cs::ConstraintSystem;
pub use witness::Witness;
