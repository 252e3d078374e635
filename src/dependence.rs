/*!

Exact data-dependence testing between two affine array references inside a perfectly
nested loop.

[`general_linear_dependence_test`] handles the fully general case: two statements `S`
and `T`, each iterating its own bounded nest, referencing the same array through
possibly different linear subscripts. [`uniform_linear_dependence_test`] specializes to
the common case where both references share the same coefficient matrix and the same
iteration nest — there the dependence distance is a single constant vector rather than
a relation between two iteration vectors, which collapses the search space from
`2m` variables down to `m`.

*/

use crate::diophantine::solve_system;
use crate::error::{Error, Result};
use crate::fourier_motzkin::{enumerate_integer_solutions, project};
use crate::matrix::{LexOrder, Matrix, RowVector, Scalar, Wide};
use tracing::instrument;

fn narrow(w: Wide, context: &str) -> Result<Scalar> {
    Scalar::try_from(w).map_err(|_| Error::Overflow(context.to_string()))
}

/// Tuning knobs shared by every dependence-test entry point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// `false` when `S` and `T` denote the same statement, suppressing dependence
    /// records at the same iteration (`d = 0`, or `I = J` in the general test).
    pub are_distinct: bool,
    /// Upper bound on both the number of Fourier-Motzkin rows carried between
    /// elimination stages and the number of integer points enumerated.
    pub enumeration_cap: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options { are_distinct: true, enumeration_cap: 1000 }
    }
}

/// One data dependence between an earlier and a later memory access.
///
/// `i` and `j` are always `S`'s and `T`'s own iteration vectors respectively — the
/// bucket a `DependenceInfo` is returned in (`T_on_S` vs. `S_on_T`) records which
/// direction the dependence flows, it never swaps which field holds which vector. In
/// the uniform case `i` and `j` are empty: any iteration pair separated by `d` within
/// the nest realizes the dependence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependenceInfo {
    /// `S`'s iteration vector, or empty in the uniform case.
    pub i: RowVector,
    /// `T`'s iteration vector, or empty in the uniform case.
    pub j: RowVector,
    /// `j - i`.
    pub d: RowVector,
    /// `signum(d)`.
    pub sig: RowVector,
    /// `level(d)`, the loop depth carrying this dependence.
    pub lev: usize,
}

fn build_info(i: RowVector, j: RowVector) -> DependenceInfo {
    let d = &j - &i;
    let sig = d.signum();
    let lev = d.level();
    DependenceInfo { i, j, d, sig, lev }
}

/// Tests for a dependence between reference `I·A + a0` (statement `S`) and `J·B + b0`
/// (statement `T`), where `S` and `T` iterate the *same* enclosing nest
/// `L = {x : P·x + p0 ≥ 0 ∧ Q·x + q0 ≥ 0}` of depth `m` — `I` and `J` each range
/// independently over `L`.
///
/// Returns `(T_on_S, S_on_T)`. Algorithm: form the subscript equality as a combined
/// Diophantine system over `[I | J]`, substitute the resulting unimodular
/// parameterization into `L`'s bound system applied once to each block, Fourier-
/// Motzkin-project the combined polytope down to the free parameters, and enumerate the
/// integer points — each one materializes a concrete `(I, J)` pair.
#[instrument(skip_all, fields(m = a.nrows(), array_dim = a.ncols()))]
#[allow(clippy::too_many_arguments)]
pub fn general_linear_dependence_test(
    a: &Matrix,
    a0: &RowVector,
    b: &Matrix,
    b0: &RowVector,
    p: &Matrix,
    p0: &RowVector,
    q: &Matrix,
    q0: &RowVector,
    options: Options,
) -> Result<(Vec<DependenceInfo>, Vec<DependenceInfo>)> {
    let m = a.nrows();
    let s = a.ncols();
    assert_eq!(b.nrows(), m, "S and T must iterate the same nest depth");
    assert_eq!(b.ncols(), s, "A and B must have the same number of columns (array dimension)");
    assert_eq!(a0.len(), s, "a0 length must equal the array dimension");
    assert_eq!(b0.len(), s, "b0 length must equal the array dimension");
    assert_eq!(p.ncols(), m, "P must have one column per iteration variable");
    assert_eq!(p0.len(), p.nrows(), "p0 length must equal P's row count");
    assert_eq!(q.ncols(), m, "Q must have one column per iteration variable");
    assert_eq!(q0.len(), q.nrows(), "q0 length must equal Q's row count");

    if m > 0 && a.rank()? == 0 && b.rank()? == 0 {
        return Err(Error::Degenerate(
            "scalar references (rank-zero A and B) over a nontrivial nest".to_string(),
        ));
    }

    let n = m;
    let total = m + n;
    let mut subscript_rows = Vec::with_capacity(total);
    for r in 0..m {
        subscript_rows.push(a.row(r));
    }
    for r in 0..n {
        subscript_rows.push(&b.row(r) * (-1 as Scalar));
    }
    let combined = Matrix::from_rows(&subscript_rows);
    let c = b0 - a0;

    let (u_total, t, rank) = match solve_system(&combined, &c) {
        Err(Error::Infeasible) => {
            tracing::debug!("subscript equality has no integer solution, no dependence");
            return Ok((Vec::new(), Vec::new()));
        }
        other => other?,
    };

    let base = u_total.mul_row(&t);
    let free_dim = total - rank;
    let u_tail = u_total.submatrix(rank, total, 0, total);

    // L's bound system (P, p0, Q, q0) applies once to the I block and once to the J
    // block, since S and T iterate the same nest independently.
    let mut nest_rows = Vec::new();
    let mut nest_consts = Vec::new();
    for (offset, block_len) in [(0, m), (m, n)] {
        for r in 0..p.nrows() {
            let mut coeffs = vec![0 as Scalar; total];
            coeffs[offset..offset + block_len].copy_from_slice(p.row(r).as_slice());
            nest_rows.push(RowVector::new(coeffs));
            nest_consts.push(p0[r]);
        }
        for r in 0..q.nrows() {
            let mut coeffs = vec![0 as Scalar; total];
            coeffs[offset..offset + block_len].copy_from_slice(q.row(r).as_slice());
            nest_rows.push(RowVector::new(coeffs));
            nest_consts.push(q0[r]);
        }
    }

    let mut y_data = Vec::with_capacity(nest_rows.len() * free_dim);
    let mut y_consts = Vec::with_capacity(nest_rows.len());
    for (row, &k) in nest_rows.iter().zip(&nest_consts) {
        let y_coeffs = u_tail.mul_col(row);
        y_data.extend_from_slice(y_coeffs.as_slice());
        let extra = row.dot_wide(&base);
        y_consts.push(narrow(k as Wide + extra, "general dependence test inequality substitution")?);
    }
    let y_matrix = Matrix::new(nest_rows.len(), free_dim, y_data);
    let v0 = RowVector::new(y_consts);

    let (lower, upper) = match project(&y_matrix, &v0, options.enumeration_cap) {
        Err(Error::Infeasible) => return Ok((Vec::new(), Vec::new())),
        other => other?,
    };
    let groups = enumerate_integer_solutions(&lower, &upper, options.enumeration_cap)?;

    let mut t_on_s = Vec::new();
    let mut s_on_t = Vec::new();
    for y in groups.into_iter().flatten() {
        let x = &base + &u_tail.mul_row(&y);
        let i_vec = x.slice(0, m);
        let j_vec = x.slice(m, total);
        if !options.are_distinct && i_vec == j_vec {
            continue;
        }
        match i_vec.compare_lex(&j_vec) {
            LexOrder::RightGreater | LexOrder::Equal => t_on_s.push(build_info(i_vec, j_vec)),
            LexOrder::LeftGreater => s_on_t.push(build_info(i_vec, j_vec)),
        }
    }

    Ok((t_on_s, s_on_t))
}

/// Specialization of [`general_linear_dependence_test`] for two references that share
/// the same subscript matrix `A` and the same nest `{I : P·I + p0 ≥ 0 ∧ -P·I + q0 ≥
/// 0}`. The dependence distance `d = J - I` then satisfies the constant equation
/// `d·A = a0 - b0`, independent of `I`; existence reduces to finding some `I` with both
/// `I` and `I + d` inside the nest, which is itself decided by eliminating `I` with
/// Fourier-Motzkin and enumerating what remains in `d`.
#[instrument(skip_all, fields(m = a.nrows(), array_dim = a.ncols()))]
pub fn uniform_linear_dependence_test(
    a: &Matrix,
    a0: &RowVector,
    b0: &RowVector,
    p: &Matrix,
    p0: &RowVector,
    q0: &RowVector,
    options: Options,
) -> Result<(Vec<DependenceInfo>, Vec<DependenceInfo>)> {
    let m = a.nrows();
    let s = a.ncols();
    assert_eq!(a0.len(), s, "a0 length must equal the array dimension");
    assert_eq!(b0.len(), s, "b0 length must equal the array dimension");
    assert_eq!(p.ncols(), m, "P must have one column per iteration variable");
    assert_eq!(p0.len(), p.nrows(), "p0 length must equal P's row count");
    assert_eq!(q0.len(), p.nrows(), "q0 length must equal P's row count");

    if m > 0 && a.rank()? == 0 {
        return Err(Error::Degenerate("scalar reference (rank-zero A) over a nontrivial nest".to_string()));
    }

    let diff = a0 - b0;
    let (u, t, rank) = match solve_system(a, &diff) {
        Err(Error::Infeasible) => {
            tracing::debug!("distance equation has no integer solution, no dependence");
            return Ok((Vec::new(), Vec::new()));
        }
        other => other?,
    };
    let base_d = u.mul_row(&t);
    let free_dim = m - rank;
    let u_tail = u.submatrix(rank, m, 0, m);
    let total = free_dim + m;
    let r_p = p.nrows();

    // Columns [0, free_dim) carry the free parameters of d; columns [free_dim, total)
    // carry I, which Fourier-Motzkin then eliminates (axes are processed highest index
    // first), leaving only bounds over d's free parameters.
    let mut rows = Vec::with_capacity(4 * r_p);
    let mut consts = Vec::with_capacity(4 * r_p);
    for r in 0..r_p {
        let p_row = p.row(r);
        let y_part = u_tail.mul_col(&p_row);
        let extra = p_row.dot_wide(&base_d);

        let mut lower_i = vec![0 as Scalar; total];
        lower_i[free_dim..total].copy_from_slice(p_row.as_slice());
        rows.push(RowVector::new(lower_i));
        consts.push(p0[r]);

        let mut upper_i = vec![0 as Scalar; total];
        for (k, v) in p_row.as_slice().iter().enumerate() {
            upper_i[free_dim + k] = -v;
        }
        rows.push(RowVector::new(upper_i));
        consts.push(q0[r]);

        let mut lower_id = vec![0 as Scalar; total];
        lower_id[..free_dim].copy_from_slice(y_part.as_slice());
        lower_id[free_dim..total].copy_from_slice(p_row.as_slice());
        rows.push(RowVector::new(lower_id));
        consts.push(narrow(p0[r] as Wide + extra, "uniform dependence test inequality substitution")?);

        let mut upper_id = vec![0 as Scalar; total];
        for (k, v) in y_part.as_slice().iter().enumerate() {
            upper_id[k] = -v;
        }
        for (k, v) in p_row.as_slice().iter().enumerate() {
            upper_id[free_dim + k] = -v;
        }
        rows.push(RowVector::new(upper_id));
        consts.push(narrow(q0[r] as Wide - extra, "uniform dependence test inequality substitution")?);
    }

    let mut data = Vec::with_capacity(rows.len() * total);
    for row in &rows {
        data.extend_from_slice(row.as_slice());
    }
    let combined = Matrix::new(rows.len(), total, data);
    let v0 = RowVector::new(consts);

    let (lower_full, upper_full) = match project(&combined, &v0, options.enumeration_cap) {
        Err(Error::Infeasible) => return Ok((Vec::new(), Vec::new())),
        other => other?,
    };
    let lower = &lower_full[..free_dim];
    let upper = &upper_full[..free_dim];
    let groups = enumerate_integer_solutions(lower, upper, options.enumeration_cap)?;

    let mut t_on_s = Vec::new();
    let mut s_on_t = Vec::new();
    for y in groups.into_iter().flatten() {
        let d = &base_d + &u_tail.mul_row(&y);
        if d.is_zero() {
            if !options.are_distinct {
                continue;
            }
            let sig = d.signum();
            let lev = d.level();
            t_on_s.push(DependenceInfo { i: RowVector::zeros(0), j: RowVector::zeros(0), d, sig, lev });
            continue;
        }
        let lev = d.level();
        if d[lev - 1] > 0 {
            let sig = d.signum();
            t_on_s.push(DependenceInfo { i: RowVector::zeros(0), j: RowVector::zeros(0), d, sig, lev });
        } else {
            let negated = -&d;
            let sig = negated.signum();
            let nlev = negated.level();
            s_on_t.push(DependenceInfo { i: RowVector::zeros(0), j: RowVector::zeros(0), d: negated, sig, lev: nlev });
        }
    }

    Ok((t_on_s, s_on_t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_test_finds_dependence() {
        // I = J + 1, both I and J ranging over the shared nest [0, 10]. Every feasible
        // pair has I > J, landing in S_on_T with constant distance -1.
        let a = Matrix::new(1, 1, vec![1]);
        let a0 = RowVector::new(vec![0]);
        let b = Matrix::new(1, 1, vec![1]);
        let b0 = RowVector::new(vec![1]);
        let p = Matrix::new(1, 1, vec![1]);
        let p0 = RowVector::new(vec![0]);
        let q = Matrix::new(1, 1, vec![-1]);
        let q0 = RowVector::new(vec![10]);

        let (t_on_s, s_on_t) = general_linear_dependence_test(
            &a, &a0, &b, &b0, &p, &p0, &q, &q0, Options::default(),
        )
        .unwrap();
        assert!(t_on_s.is_empty());
        assert_eq!(s_on_t.len(), 10);
        for info in &s_on_t {
            assert_eq!(info.d, RowVector::new(vec![-1]));
            assert_eq!(info.sig, RowVector::new(vec![-1]));
            assert_eq!(info.lev, 1);
            assert_eq!(&info.i - &info.j, RowVector::new(vec![1]));
        }
    }

    #[test]
    fn general_test_no_dependence() {
        // 2I = 2J + 1 has no integer solution at all.
        let a = Matrix::new(1, 1, vec![2]);
        let a0 = RowVector::new(vec![0]);
        let b = Matrix::new(1, 1, vec![2]);
        let b0 = RowVector::new(vec![1]);
        let p = Matrix::new(1, 1, vec![1]);
        let p0 = RowVector::new(vec![0]);
        let q = Matrix::new(1, 1, vec![-1]);
        let q0 = RowVector::new(vec![10]);

        let (t_on_s, s_on_t) = general_linear_dependence_test(
            &a, &a0, &b, &b0, &p, &p0, &q, &q0, Options::default(),
        )
        .unwrap();
        assert!(t_on_s.is_empty() && s_on_t.is_empty());
    }

    #[test]
    fn uniform_test_finds_dependence() {
        // Shared subscript A = [1]; d*1 = 5 - 3 = 2. Nest is 0 <= I <= 20.
        let a = Matrix::new(1, 1, vec![1]);
        let a0 = RowVector::new(vec![5]);
        let b0 = RowVector::new(vec![3]);
        let p = Matrix::new(1, 1, vec![1]);
        let p0 = RowVector::new(vec![0]);
        let q0 = RowVector::new(vec![20]);

        let (t_on_s, s_on_t) = uniform_linear_dependence_test(
            &a, &a0, &b0, &p, &p0, &q0, Options::default(),
        )
        .unwrap();
        assert_eq!(t_on_s.len(), 1);
        assert!(s_on_t.is_empty());
        assert_eq!(t_on_s[0].d, RowVector::new(vec![2]));
        assert_eq!(t_on_s[0].lev, 1);
        assert!(t_on_s[0].i.is_empty() && t_on_s[0].j.is_empty());
    }

    #[test]
    fn uniform_test_no_dependence() {
        // d*2 = 0 - 3 = -3 has no integer solution (gcd(2) does not divide 3).
        let a = Matrix::new(1, 1, vec![2]);
        let a0 = RowVector::new(vec![0]);
        let b0 = RowVector::new(vec![3]);
        let p = Matrix::new(1, 1, vec![1]);
        let p0 = RowVector::new(vec![0]);
        let q0 = RowVector::new(vec![20]);

        let (t_on_s, s_on_t) = uniform_linear_dependence_test(
            &a, &a0, &b0, &p, &p0, &q0, Options::default(),
        )
        .unwrap();
        assert!(t_on_s.is_empty() && s_on_t.is_empty());
    }

    #[test]
    fn uniform_test_suppresses_self_dependence_when_not_distinct() {
        let a = Matrix::new(1, 1, vec![1]);
        let a0 = RowVector::new(vec![0]);
        let b0 = RowVector::new(vec![0]);
        let p = Matrix::new(1, 1, vec![1]);
        let p0 = RowVector::new(vec![0]);
        let q0 = RowVector::new(vec![20]);
        let options = Options { are_distinct: false, enumeration_cap: 1000 };

        let (t_on_s, s_on_t) =
            uniform_linear_dependence_test(&a, &a0, &b0, &p, &p0, &q0, options).unwrap();
        assert!(t_on_s.is_empty() && s_on_t.is_empty());
    }
}
