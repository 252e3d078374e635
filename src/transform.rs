/*!

Unimodular loop-nest transformations.

Given the distance vectors carried by a loop nest, [`find_outer_loop_transform_matrix`]
and [`find_inner_loop_transform_matrix`] synthesize a unimodular matrix `U` that
re-coordinates the iteration space so that either the maximum possible prefix of
outermost loops becomes dependence-free (outer/DOALL parallelization) or every
dependence is concentrated onto a single coordinate (inner parallelization, freeing
every other loop). [`calculate_transformed_nest_limits`] then re-expresses the original
nest's bounds in the transformed coordinates.

*/

use crate::error::{Error, Result};
use crate::fourier_motzkin::{project, Bound};
use crate::matrix::{Matrix, RowVector, Scalar, Wide};
use tracing::instrument;

fn narrow(w: Wide, context: &str) -> Result<Scalar> {
    Scalar::try_from(w).map_err(|_| Error::Overflow(context.to_string()))
}

fn reverse_cols(a: &Matrix) -> Matrix {
    let (r, c) = (a.nrows(), a.ncols());
    let mut data = Vec::with_capacity(r * c);
    for i in 0..r {
        for j in 0..c {
            data.push(a.get(i, c - 1 - j));
        }
    }
    Matrix::new(r, c, data)
}

fn reverse_rows_and_cols(a: &Matrix) -> Matrix {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "expected a square matrix");
    let mut data = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            data.push(a.get(n - 1 - i, n - 1 - j));
        }
    }
    Matrix::new(n, n, data)
}

/// Finds a unimodular `U` (`m x m`, `m = d.ncols()`) such that the leading `n` columns
/// of `d . U` are entirely zero, where `n = m - rank(d)` is the number of loops that can
/// be hoisted outermost and run dependence-free. Returns `(n, U)`.
///
/// Grounded on Hermite column reduction (§4.1): reducing `d` with its columns reversed
/// puts the pivot columns first and the zero columns last in the reversed frame;
/// reversing both the row and column index of the resulting transform folds that back
/// into "zero columns first" in the original column order.
#[instrument(skip_all, fields(rows = d.nrows(), m = d.ncols()))]
pub fn find_outer_loop_transform_matrix(d: &Matrix) -> Result<(usize, Matrix)> {
    if d.nrows() == 0 {
        return Err(Error::Degenerate("no distance vectors to transform".to_string()));
    }
    let m = d.ncols();
    let d_rev = reverse_cols(d);
    let (_h, u_rev, rank) = d_rev.hermite_column_reduce()?;
    let u = reverse_rows_and_cols(&u_rev);
    let n = m - rank;
    tracing::debug!(n, "outer loops freed from this dependence set");
    Ok((n, u))
}

/// Finds a unimodular `U` (`m x m`) such that every nonzero row of `d . U` has a
/// nonzero first component — every carried dependence is concentrated onto a single
/// coordinate, freeing the remaining `m - 1` loops from sequential ordering by that
/// dependence set (at the cost of making the first transformed loop fully sequential).
///
/// Requires `m > 1`: with a single loop there is nothing left to free up.
///
/// Construction: the first column `u1` of `U` must avoid every hyperplane
/// `{x : row . x = 0}` for the nonzero distance rows. `u1 = (1, c, c^2, ..., c^{m-1})`
/// dotted with a row of `d` is a nonzero-coefficient polynomial in `c` (the row is
/// itself nonzero), so it has finitely many roots; trying successive integers `c = 1,
/// 2, 3, ...` is guaranteed to clear every row's polynomial within
/// `(m - 1) * rows + 1` tries by a pigeonhole argument. `u1[0] = 1` keeps the column
/// primitive, so extending it with the trailing standard basis vectors
/// (`U = I` with column 0 replaced by `u1`) is already unimodular — `U` is lower
/// triangular with a unit diagonal.
#[instrument(skip_all, fields(rows = d.nrows(), m = d.ncols()))]
pub fn find_inner_loop_transform_matrix(d: &Matrix) -> Result<Matrix> {
    if d.nrows() == 0 {
        return Err(Error::Degenerate("no distance vectors to transform".to_string()));
    }
    let m = d.ncols();
    if m <= 1 {
        return Err(Error::Degenerate(
            "inner loop transform requires at least two loops".to_string(),
        ));
    }

    let nonzero_rows: Vec<RowVector> =
        (0..d.nrows()).map(|r| d.row(r)).filter(|row| !row.is_zero()).collect();

    let u1 = if nonzero_rows.is_empty() {
        RowVector::new(std::iter::once(1 as Scalar).chain(std::iter::repeat(0).take(m - 1)).collect())
    } else {
        let search_limit = nonzero_rows.len() * (m - 1) + 1;
        let mut found = None;
        for c in 1..=search_limit as Wide {
            let mut powers = Vec::with_capacity(m);
            powers.push(1 as Scalar);
            let mut p: Wide = 1;
            for _ in 1..m {
                p *= c;
                powers.push(narrow(p, "inner loop transform power")?);
            }
            let candidate = RowVector::new(powers);
            if nonzero_rows.iter().all(|row| row.dot_wide(&candidate) != 0) {
                found = Some(candidate);
                break;
            }
        }
        found.ok_or_else(|| {
            Error::Internal("inner loop transform search exhausted its pigeonhole bound".to_string())
        })?
    };

    let mut u = Matrix::identity(m);
    for i in 0..m {
        u.set(i, 0, u1[i]);
    }
    Ok(u)
}

/// Re-expresses the nest `{I : P·I + p0 ≥ 0 ∧ Q·I + q0 ≥ 0}` in the coordinates of a
/// transformed iteration vector `I'` related to `I` by `I = I'·U` (`U` unimodular, as
/// returned by [`find_outer_loop_transform_matrix`] or
/// [`find_inner_loop_transform_matrix`]). `P` and `Q` carry whatever signs the caller
/// needs for lower and upper bounds respectively (an upper bound `x <= k` is supplied
/// as a row of `-1` with constant `k`); this function does not negate either.
///
/// Substituting `I = I'·U` turns each bound row `row·I + k ≥ 0` into
/// `(U·row)·I' + k ≥ 0` (the constant is untouched; only the coefficient row is
/// transformed, by the same `mul_col` pattern the dependence tests use), then
/// Fourier-Motzkin-projects the result down to per-level bounds on `I'`.
#[instrument(skip_all, fields(m = u.nrows()))]
#[allow(clippy::too_many_arguments)]
pub fn calculate_transformed_nest_limits(
    u: &Matrix,
    p0: &RowVector,
    p: &Matrix,
    q0: &RowVector,
    q: &Matrix,
    row_cap: usize,
) -> Result<(Vec<Vec<Bound>>, Vec<Vec<Bound>>)> {
    let m = u.nrows();
    assert_eq!(u.ncols(), m, "U must be square");
    assert_eq!(p.ncols(), m, "P must have one column per loop index");
    assert_eq!(q.ncols(), m, "Q must have one column per loop index");
    assert_eq!(p0.len(), p.nrows(), "p0 length must equal P's row count");
    assert_eq!(q0.len(), q.nrows(), "q0 length must equal Q's row count");

    let mut rows = Vec::with_capacity(p.nrows() + q.nrows());
    let mut consts = Vec::with_capacity(p.nrows() + q.nrows());
    for r in 0..p.nrows() {
        rows.push(u.mul_col(&p.row(r)));
        consts.push(p0[r]);
    }
    for r in 0..q.nrows() {
        rows.push(u.mul_col(&q.row(r)));
        consts.push(q0[r]);
    }
    let combined = Matrix::from_rows(&rows);
    let v0 = RowVector::new(consts);
    project(&combined, &v0, row_cap)
}
