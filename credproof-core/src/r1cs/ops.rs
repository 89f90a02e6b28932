//! Defines the Linear Combination (LC) object and associated operations.
//! A LinearCombination is a vector of Terms, where each Term is a pair of a Variable and a coefficient.

use std::fmt::Debug;

use ark_std::{One, Zero};

use crate::field::FieldElement;

/// Role of a wire. Public wires form the public-input vector in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariableKind {
    Public,
    Secret,
    Internal,
}

/// Opaque handle to a wire. Indices count declarations per kind, starting at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    /// The implicit wire fixed to one.
    Constant,
    Public(usize),
    Secret(usize),
    Internal(usize),
}

impl Variable {
    pub fn kind(&self) -> Option<VariableKind> {
        match self {
            Variable::Constant => None,
            Variable::Public(_) => Some(VariableKind::Public),
            Variable::Secret(_) => Some(VariableKind::Secret),
            Variable::Internal(_) => Some(VariableKind::Internal),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct Term(pub Variable, pub FieldElement);

/// Linear Combination of terms. Never holds two terms over the same variable.
#[derive(Clone, PartialEq, Default)]
pub struct LC(Vec<Term>);

impl LC {
    pub fn new(terms: Vec<Term>) -> Self {
        let mut lc = LC(Vec::with_capacity(terms.len()));
        for term in terms {
            lc.accumulate(term);
        }
        lc
    }

    pub fn zero() -> Self {
        LC(vec![])
    }

    pub fn constant(value: FieldElement) -> Self {
        LC::new(vec![Term(Variable::Constant, value)])
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    pub fn num_terms(&self) -> usize {
        self.0.len()
    }

    pub fn constant_term(&self) -> Option<&Term> {
        self.0.iter().find(|term| term.0 == Variable::Constant)
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.iter().map(|term| term.0)
    }

    pub fn scale(mut self, factor: FieldElement) -> Self {
        if factor.is_zero() {
            return LC::zero();
        }
        self.0.iter_mut().for_each(|term| term.1 *= factor);
        self
    }

    /// Evaluates the combination, resolving each variable through `value_of`.
    pub fn evaluate(&self, mut value_of: impl FnMut(Variable) -> FieldElement) -> FieldElement {
        self.0.iter().fold(FieldElement::zero(), |acc, term| match term.0 {
            Variable::Constant => acc + term.1,
            var => acc + value_of(var) * term.1,
        })
    }

    fn accumulate(&mut self, term: Term) {
        if let Some(pos) = self.0.iter().position(|t| t.0 == term.0) {
            self.0[pos].1 += term.1;
            if self.0[pos].1.is_zero() {
                self.0.remove(pos);
            }
        } else if !term.1.is_zero() {
            self.0.push(term);
        }
    }
}

impl Debug for LC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LC(")?;
        for (index, term) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{:?}", term)?;
        }
        write!(f, ")")
    }
}

impl Debug for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{:?}", self.1, self.0)
    }
}

// Arithmetic for LC

impl std::ops::Add for LC {
    type Output = Self;

    fn add(mut self, other: Self) -> Self::Output {
        for term in other.0 {
            self.accumulate(term);
        }
        self
    }
}

impl std::ops::Neg for LC {
    type Output = Self;

    fn neg(self) -> Self::Output {
        LC(self.0.into_iter().map(|term| -term).collect())
    }
}

impl std::ops::Sub for LC {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + (-other)
    }
}

impl std::ops::Add<FieldElement> for LC {
    type Output = Self;

    fn add(self, other: FieldElement) -> Self::Output {
        self + LC::constant(other)
    }
}

impl std::ops::Add<Variable> for LC {
    type Output = Self;

    fn add(self, other: Variable) -> Self::Output {
        self + LC::from(other)
    }
}

impl std::ops::Sub<Variable> for LC {
    type Output = Self;

    fn sub(self, other: Variable) -> Self::Output {
        self - LC::from(other)
    }
}

// Arithmetic for Term

impl std::ops::Neg for Term {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Term(self.0, -self.1)
    }
}

impl std::ops::Add for Term {
    type Output = LC;

    fn add(self, other: Self) -> Self::Output {
        LC::new(vec![self, other])
    }
}

impl std::ops::Sub for Term {
    type Output = LC;

    fn sub(self, other: Self) -> Self::Output {
        LC::new(vec![self, -other])
    }
}

// Arithmetic for Variable

impl std::ops::Add for Variable {
    type Output = LC;

    fn add(self, other: Self) -> Self::Output {
        LC::new(vec![Term(self, FieldElement::one()), Term(other, FieldElement::one())])
    }
}

impl std::ops::Sub for Variable {
    type Output = LC;

    fn sub(self, other: Self) -> Self::Output {
        LC::new(vec![Term(self, FieldElement::one()), Term(other, -FieldElement::one())])
    }
}

impl std::ops::Add<LC> for Variable {
    type Output = LC;

    fn add(self, other: LC) -> Self::Output {
        LC::from(self) + other
    }
}

impl std::ops::Add<FieldElement> for Variable {
    type Output = LC;

    fn add(self, other: FieldElement) -> Self::Output {
        LC::from(self) + other
    }
}

impl std::ops::Mul<FieldElement> for Variable {
    type Output = Term;

    fn mul(self, other: FieldElement) -> Self::Output {
        Term(self, other)
    }
}

// Into<LC>

impl From<FieldElement> for LC {
    fn from(val: FieldElement) -> Self {
        LC::constant(val)
    }
}

impl From<Variable> for LC {
    fn from(val: Variable) -> Self {
        LC::new(vec![Term(val, FieldElement::one())])
    }
}

impl From<Term> for LC {
    fn from(val: Term) -> Self {
        LC::new(vec![val])
    }
}

impl From<Vec<Term>> for LC {
    fn from(val: Vec<Term>) -> Self {
        LC::new(val)
    }
}

impl From<Variable> for Term {
    fn from(val: Variable) -> Self {
        Term(val, FieldElement::one())
    }
}
