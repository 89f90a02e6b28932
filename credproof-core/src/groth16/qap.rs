//! R1CS to QAP reduction over a radix-2 evaluation domain (libsnark style).
//!
//! Row `i` of the system is bound to the domain element `w^i`. Instance column `j` gets an
//! extra row `num_constraints + j` with `A = z_j`, `B = C = 0`.

use ark_ff::{FftField, Field};
use ark_poly::{EvaluationDomain, GeneralEvaluationDomain};
use ark_std::Zero;
use rayon::prelude::*;
use zeroize::Zeroizing;

use crate::{
    field::FieldElement,
    r1cs::{constraint_system::evaluate_row, ConstraintSystem},
};

pub type Domain = GeneralEvaluationDomain<FieldElement>;

/// Rows the domain must cover.
pub fn num_qap_rows(cs: &ConstraintSystem) -> usize {
    cs.num_constraints() + cs.num_instance_columns()
}

pub fn domain_for(cs: &ConstraintSystem) -> Option<Domain> {
    Domain::new(num_qap_rows(cs))
}

/// Per-column evaluations of the QAP polynomials at a point. Derived from the setup
/// trapdoor, so it is wiped on drop.
pub struct QapEvaluations {
    pub a: Zeroizing<Vec<FieldElement>>,
    pub b: Zeroizing<Vec<FieldElement>>,
    pub c: Zeroizing<Vec<FieldElement>>,
    /// `Z(tau)`, the vanishing polynomial of the domain.
    pub zt: FieldElement,
}

/// Evaluates `A_j(tau)`, `B_j(tau)`, `C_j(tau)` for every column `j`.
#[tracing::instrument(skip_all, name = "qap::evaluate_at")]
pub fn evaluate_at(cs: &ConstraintSystem, domain: &Domain, tau: FieldElement) -> QapEvaluations {
    let zt = domain.evaluate_vanishing_polynomial(tau);
    let lagrange = Zeroizing::new(domain.evaluate_all_lagrange_coefficients(tau));

    let num_columns = cs.num_columns();
    let mut a = Zeroizing::new(vec![FieldElement::zero(); num_columns]);
    let mut b = Zeroizing::new(vec![FieldElement::zero(); num_columns]);
    let mut c = Zeroizing::new(vec![FieldElement::zero(); num_columns]);

    for (i, (row_a, row_b, row_c)) in cs.rows().enumerate() {
        let u = lagrange[i];
        for (coeff, col) in row_a {
            a[*col] += u * coeff;
        }
        for (coeff, col) in row_b {
            b[*col] += u * coeff;
        }
        for (coeff, col) in row_c {
            c[*col] += u * coeff;
        }
    }

    let num_constraints = cs.num_constraints();
    for j in 0..cs.num_instance_columns() {
        a[j] += lagrange[num_constraints + j];
    }

    QapEvaluations { a, b, c, zt }
}

/// Coefficients of `H(x) = (A(x)B(x) - C(x)) / Z(x)` for a satisfying assignment, computed
/// on the coset `g * domain` where `Z` does not vanish.
#[tracing::instrument(skip_all, name = "qap::witness_map")]
pub fn witness_map(
    cs: &ConstraintSystem,
    domain: &Domain,
    assignment: &[FieldElement],
) -> Option<Zeroizing<Vec<FieldElement>>> {
    let size = domain.size();
    let num_constraints = cs.num_constraints();

    let mut a = Zeroizing::new(vec![FieldElement::zero(); size]);
    let mut b = Zeroizing::new(vec![FieldElement::zero(); size]);
    let mut c = Zeroizing::new(vec![FieldElement::zero(); size]);

    let rows: Vec<_> = cs.rows().collect();
    a[..num_constraints]
        .par_iter_mut()
        .zip(b[..num_constraints].par_iter_mut())
        .zip(c[..num_constraints].par_iter_mut())
        .zip(rows.par_iter())
        .for_each(|(((a_i, b_i), c_i), (row_a, row_b, row_c))| {
            *a_i = evaluate_row(row_a, assignment);
            *b_i = evaluate_row(row_b, assignment);
            *c_i = evaluate_row(row_c, assignment);
        });
    for j in 0..cs.num_instance_columns() {
        a[num_constraints + j] = assignment[j];
    }

    let coset = domain.get_coset(FieldElement::GENERATOR)?;

    domain.ifft_in_place(&mut a);
    domain.ifft_in_place(&mut b);
    domain.ifft_in_place(&mut c);
    coset.fft_in_place(&mut a);
    coset.fft_in_place(&mut b);
    coset.fft_in_place(&mut c);

    let vanishing_inv = domain
        .evaluate_vanishing_polynomial(FieldElement::GENERATOR)
        .inverse()?;

    let mut h = a;
    h.par_iter_mut()
        .zip(b.par_iter())
        .zip(c.par_iter())
        .for_each(|((h_i, b_i), c_i)| {
            *h_i = (*h_i * b_i - c_i) * vanishing_inv;
        });
    coset.ifft_in_place(&mut h);

    Some(h)
}
