pub mod builder;
pub mod constraint_system;
pub mod ops;

pub use builder::R1CSBuilder;
pub use constraint_system::ConstraintSystem;
pub use ops::{Term, Variable, VariableKind, LC};
