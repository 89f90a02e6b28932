use super::{
    constraint_system::{ConstraintSystem, Derivation, SparseRow},
    ops::{Variable, VariableKind, LC},
};
use crate::utils::errors::CompileError;

/// Constraint over a single row: `a * b == c`.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub a: LC,
    pub b: LC,
    pub c: LC,
}

/// Accumulates wires and rank-1 constraints. Allocation order is deterministic, so the same
/// sequence of calls always yields the same [`ConstraintSystem`].
#[derive(Default)]
pub struct R1CSBuilder {
    num_public: usize,
    num_secret: usize,
    constraints: Vec<Constraint>,
    /// Indexed by internal wire. `None` until a product is attached.
    derivations: Vec<Option<(LC, LC)>>,
}

impl R1CSBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, kind: VariableKind) -> Variable {
        match kind {
            VariableKind::Public => {
                self.num_public += 1;
                Variable::Public(self.num_public - 1)
            }
            VariableKind::Secret => {
                self.num_secret += 1;
                Variable::Secret(self.num_secret - 1)
            }
            VariableKind::Internal => {
                self.derivations.push(None);
                Variable::Internal(self.derivations.len() - 1)
            }
        }
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn add_constraint(&mut self, a: impl Into<LC>, b: impl Into<LC>, c: impl Into<LC>) {
        self.constraints.push(Constraint {
            a: a.into(),
            b: b.into(),
            c: c.into(),
        });
    }

    pub fn assert_equal(&mut self, left: impl Into<LC>, right: impl Into<LC>) {
        self.constrain_eq(left, right)
    }

    pub fn constrain_eq(&mut self, left: impl Into<LC>, right: impl Into<LC>) {
        // (left - right) * 1 == 0
        let left: LC = left.into();
        let right: LC = right.into();
        self.add_constraint(left - right, Variable::Constant, LC::zero());
    }

    /// Constrain x * y == z
    pub fn constrain_prod(&mut self, x: impl Into<LC>, y: impl Into<LC>, z: impl Into<LC>) {
        self.add_constraint(x, y, z)
    }

    /// Allocates an internal wire holding `x * y` and constrains it.
    pub fn mul(&mut self, x: impl Into<LC>, y: impl Into<LC>) -> Variable {
        let (x, y): (LC, LC) = (x.into(), y.into());
        let out = Variable::Internal(self.derivations.len());
        self.derivations.push(Some((x.clone(), y.clone())));
        self.constrain_prod(x, y, out);
        out
    }

    /// Attaches `x * y` as the value of an internal wire obtained from [`Self::declare`], and
    /// constrains it.
    pub fn define_product(
        &mut self,
        out: Variable,
        x: impl Into<LC>,
        y: impl Into<LC>,
    ) -> Result<(), CompileError> {
        let index = match out {
            Variable::Internal(index) if index < self.derivations.len() => index,
            Variable::Internal(_) => {
                return Err(CompileError::UndeclaredVariable(format!("{out:?}")))
            }
            _ => {
                return Err(CompileError::InvalidShape(format!(
                    "only internal wires can be derived, got {out:?}"
                )))
            }
        };
        if self.derivations[index].is_some() {
            return Err(CompileError::DuplicateDerivation(index));
        }
        let (x, y): (LC, LC) = (x.into(), y.into());
        self.constrain_prod(x.clone(), y.clone(), out);
        self.derivations[index] = Some((x, y));
        Ok(())
    }

    fn column(&self, var: Variable) -> Result<usize, CompileError> {
        let first_secret = 1 + self.num_public;
        let first_internal = first_secret + self.num_secret;
        match var {
            Variable::Constant => Ok(0),
            Variable::Public(i) if i < self.num_public => Ok(1 + i),
            Variable::Secret(i) if i < self.num_secret => Ok(first_secret + i),
            Variable::Internal(i) if i < self.derivations.len() => Ok(first_internal + i),
            _ => Err(CompileError::UndeclaredVariable(format!("{var:?}"))),
        }
    }

    fn materialize_lc(&self, lc: &LC) -> Result<SparseRow, CompileError> {
        let mut row: SparseRow = lc
            .terms()
            .iter()
            .map(|term| Ok((term.1, self.column(term.0)?)))
            .collect::<Result<_, CompileError>>()?;
        row.sort_by_key(|(_, col)| *col);
        Ok(row)
    }

    /// Freezes the builder. Fails only on structural misuse.
    #[tracing::instrument(skip_all, name = "R1CSBuilder::build")]
    pub fn build(self) -> Result<ConstraintSystem, CompileError> {
        let num_rows = self.constraints.len();
        let mut a = Vec::with_capacity(num_rows);
        let mut b = Vec::with_capacity(num_rows);
        let mut c = Vec::with_capacity(num_rows);
        for constraint in &self.constraints {
            a.push(self.materialize_lc(&constraint.a)?);
            b.push(self.materialize_lc(&constraint.b)?);
            c.push(self.materialize_lc(&constraint.c)?);
        }

        let first_internal = 1 + self.num_public + self.num_secret;
        let mut derivations = Vec::with_capacity(self.derivations.len());
        for (index, derivation) in self.derivations.iter().enumerate() {
            let (x, y) = derivation
                .as_ref()
                .ok_or(CompileError::UnderivedVariable(index))?;
            let (x, y) = (self.materialize_lc(x)?, self.materialize_lc(y)?);
            // The assigner fills internal wires in column order.
            let own_column = first_internal + index;
            if x.iter().chain(y.iter()).any(|(_, col)| *col >= own_column) {
                return Err(CompileError::InvalidShape(format!(
                    "internal wire {index} depends on a wire assigned after it"
                )));
            }
            derivations.push(Derivation { a: x, b: y });
        }

        let cs = ConstraintSystem::from_parts(
            self.num_public,
            self.num_secret,
            self.derivations.len(),
            a,
            b,
            c,
            derivations,
        );
        tracing::debug!(
            constraints = cs.num_constraints(),
            columns = cs.num_columns(),
            "constraint system built"
        );
        Ok(cs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldElement;
    use ark_std::One;

    fn fe(x: u64) -> FieldElement {
        FieldElement::from(x)
    }

    #[test]
    fn allocation_is_deterministic() {
        let build = || {
            let mut builder = R1CSBuilder::new();
            let x = builder.declare(VariableKind::Secret);
            let p = builder.declare(VariableKind::Public);
            let sq = builder.mul(x, x);
            builder.constrain_eq(sq, p);
            builder.build().unwrap()
        };
        let (first, second) = (build(), build());
        assert_eq!(first, second);
        assert_eq!(first.digest(), second.digest());
        assert_eq!(first.num_constraints(), 2);
        assert_eq!(first.num_columns(), 4);
    }

    #[test]
    fn column_layout_puts_public_first() {
        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        let p0 = builder.declare(VariableKind::Public);
        let p1 = builder.declare(VariableKind::Public);
        let t = builder.mul(s, p0);
        builder.constrain_eq(t, p1);
        let cs = builder.build().unwrap();
        // [1, p0, p1, s, t]
        assert_eq!(cs.num_instance_columns(), 3);
        assert_eq!(cs.first_secret_column(), 3);
        assert_eq!(cs.first_internal_column(), 4);
        let (a, b, c) = cs.rows().next().unwrap();
        assert_eq!(a, &vec![(fe(1), 3)]);
        assert_eq!(b, &vec![(fe(1), 1)]);
        assert_eq!(c, &vec![(fe(1), 4)]);
    }

    #[test]
    fn equality_row_shape() {
        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        let p = builder.declare(VariableKind::Public);
        builder.assert_equal(s, p);
        let cs = builder.build().unwrap();
        let (a, b, c) = cs.rows().next().unwrap();
        assert_eq!(a, &vec![(-FieldElement::one(), 1), (fe(1), 2)]);
        assert_eq!(b, &vec![(fe(1), 0)]);
        assert!(c.is_empty());
    }

    #[test]
    fn foreign_variable_is_rejected() {
        let mut other = R1CSBuilder::new();
        other.declare(VariableKind::Secret);
        let foreign = other.declare(VariableKind::Secret);

        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        builder.constrain_eq(s, foreign);
        assert!(matches!(
            builder.build(),
            Err(CompileError::UndeclaredVariable(_))
        ));
    }

    #[test]
    fn underived_internal_is_rejected() {
        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        let t = builder.declare(VariableKind::Internal);
        builder.constrain_eq(s, t);
        assert_eq!(builder.build(), Err(CompileError::UnderivedVariable(0)));
    }

    #[test]
    fn define_product_checks_target() {
        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        let t = builder.declare(VariableKind::Internal);
        assert!(matches!(
            builder.define_product(s, s, s),
            Err(CompileError::InvalidShape(_))
        ));
        assert!(matches!(
            builder.define_product(Variable::Internal(7), s, s),
            Err(CompileError::UndeclaredVariable(_))
        ));
        builder.define_product(t, s, s).unwrap();
        assert_eq!(
            builder.define_product(t, s, s),
            Err(CompileError::DuplicateDerivation(0))
        );
        assert!(builder.build().is_ok());
    }

    #[test]
    fn forward_dependency_is_rejected() {
        let mut builder = R1CSBuilder::new();
        let s = builder.declare(VariableKind::Secret);
        let t0 = builder.declare(VariableKind::Internal);
        let t1 = builder.declare(VariableKind::Internal);
        builder.define_product(t0, t1, s).unwrap();
        builder.define_product(t1, s, s).unwrap();
        assert!(matches!(
            builder.build(),
            Err(CompileError::InvalidShape(_))
        ));
    }
}
