//! Integration tests for the general and uniform dependence tests, covering the
//! concrete scenarios worked through by hand in the crate's design notes.

use unimodular_dependence::dependence::{general_linear_dependence_test, uniform_linear_dependence_test, Options};
use unimodular_dependence::matrix::{Matrix, RowVector};

#[test]
fn general_test_single_loop_dependence_exists() {
    // S: A[I], T: A[J+3], both over the shared nest 0 <= x <= 20.
    let a = Matrix::new(1, 1, vec![1]);
    let a0 = RowVector::new(vec![0]);
    let b = Matrix::new(1, 1, vec![1]);
    let b0 = RowVector::new(vec![3]);
    let p = Matrix::new(1, 1, vec![1]);
    let p0 = RowVector::new(vec![0]);
    let q = Matrix::new(1, 1, vec![-1]);
    let q0 = RowVector::new(vec![20]);

    let (t_on_s, s_on_t) =
        general_linear_dependence_test(&a, &a0, &b, &b0, &p, &p0, &q, &q0, Options::default()).unwrap();

    // I = J + 3, feasible for J in [0, 17], I in [3, 20]: 18 pairs, all with I > J.
    assert!(t_on_s.is_empty());
    assert_eq!(s_on_t.len(), 18);
    for info in &s_on_t {
        assert_eq!(info.d, RowVector::new(vec![-3]));
        assert_eq!(&info.j - &info.i, RowVector::new(vec![-3]));
    }
}

#[test]
fn general_test_no_dependence() {
    // I even, J odd in the same array position can never coincide.
    let a = Matrix::new(1, 1, vec![2]);
    let a0 = RowVector::new(vec![0]);
    let b = Matrix::new(1, 1, vec![2]);
    let b0 = RowVector::new(vec![1]);
    let p = Matrix::new(1, 1, vec![1]);
    let p0 = RowVector::new(vec![0]);
    let q = Matrix::new(1, 1, vec![-1]);
    let q0 = RowVector::new(vec![20]);

    let (t_on_s, s_on_t) =
        general_linear_dependence_test(&a, &a0, &b, &b0, &p, &p0, &q, &q0, Options::default()).unwrap();
    assert!(t_on_s.is_empty() && s_on_t.is_empty());
}

#[test]
fn uniform_test_2d_dependence_exists() {
    // S: A[I1 + 1, I2], T: A[I1, I2] (the classic "i+1" stencil), nest 0 <= x1, x2 <= 9.
    let a = Matrix::new(2, 2, vec![1, 0, 0, 1]);
    let a0 = RowVector::new(vec![1, 0]);
    let b0 = RowVector::new(vec![0, 0]);
    let p = Matrix::new(2, 2, vec![1, 0, 0, 1]);
    let p0 = RowVector::new(vec![0, 0]);
    let q0 = RowVector::new(vec![9, 9]);

    let (t_on_s, s_on_t) =
        uniform_linear_dependence_test(&a, &a0, &b0, &p, &p0, &q0, Options::default()).unwrap();

    assert_eq!(t_on_s.len(), 1);
    assert!(s_on_t.is_empty());
    assert_eq!(t_on_s[0].d, RowVector::new(vec![1, 0]));
    assert_eq!(t_on_s[0].lev, 1);
}

#[test]
fn uniform_test_no_dependence() {
    // A[2*I1, I2] vs A[2*I1 + 1, I2]: first coordinate always differs by an odd
    // number, never achievable via a 2 * d1 step.
    let a = Matrix::new(2, 2, vec![2, 0, 0, 1]);
    let a0 = RowVector::new(vec![0, 0]);
    let b0 = RowVector::new(vec![1, 0]);
    let p = Matrix::new(2, 2, vec![1, 0, 0, 1]);
    let p0 = RowVector::new(vec![0, 0]);
    let q0 = RowVector::new(vec![9, 9]);

    let (t_on_s, s_on_t) =
        uniform_linear_dependence_test(&a, &a0, &b0, &p, &p0, &q0, Options::default()).unwrap();
    assert!(t_on_s.is_empty() && s_on_t.is_empty());
}

#[test]
fn degenerate_scalar_reference_over_nontrivial_nest_is_reported() {
    let a = Matrix::new(1, 1, vec![0]);
    let a0 = RowVector::new(vec![0]);
    let b0 = RowVector::new(vec![0]);
    let p = Matrix::new(1, 1, vec![1]);
    let p0 = RowVector::new(vec![0]);
    let q0 = RowVector::new(vec![9]);

    let result = uniform_linear_dependence_test(&a, &a0, &b0, &p, &p0, &q0, Options::default());
    assert!(result.is_err());
}
