/*!

Integer solutions of linear Diophantine equations and systems.

Given `t . a = c` (one equation, `t` and `a` column vectors of the same length) or
`t . U . A = c` (a system, `t` row, `A` an `m x s` coefficient matrix, `c` length `s`),
this module decides solvability and — when solvable — returns a unimodular
reparameterization of the full integer solution set: a matrix `U` and a prefix of
determined values such that *any* integer choice of the remaining free parameters
yields a valid solution. The multiplication convention (`t . U . A`, row vector on the
left) matches the reference test harness this crate's scenarios are drawn from.

*/

use crate::error::{Error, Result};
use crate::matrix::{Matrix, RowVector, Scalar, Wide};

fn narrow(w: Wide, context: &str) -> Result<Scalar> {
    Scalar::try_from(w).map_err(|_| Error::Overflow(context.to_string()))
}

/// Solves `t . U . a = c` for an integer vector `t` of length `a.len()`, where `U` is
/// the unimodular matrix this function returns.
///
/// Equivalently: finds unimodular `U` with `U . a = (g, 0, 0, ..., 0)` where
/// `g = gcd(a[0], ..., a[m-1])`, so that `t . U . a == t[0] * g` for every `t` —
/// solvable for `c` iff `g` divides `c`, in which case `t1 = c / g` is the required
/// value of `t[0]` and every other component of `t` is free.
///
/// The empty vector is solvable only for `c == 0`.
pub fn solve_one_equation(a: &RowVector, c: Scalar) -> Result<(Matrix, Scalar)> {
    let m = a.len();
    if m == 0 {
        return if c == 0 {
            Ok((Matrix::identity(0), 0))
        } else {
            Err(Error::Infeasible)
        };
    }

    // Column-reduce the 1xm matrix a^T: a^T . V = H, V unimodular. Transposing gives
    // V^T . a = H^T = (g, 0, ..., 0)^T, so U := V^T is the matrix we want.
    let a_row = Matrix::from_rows(&[a.clone()]);
    let (h, v, _rank) = a_row.hermite_column_reduce()?;
    let g = h.get(0, 0);
    let u = v.transpose();

    if g == 0 {
        return if c == 0 { Ok((u, 0)) } else { Err(Error::Infeasible) };
    }
    if c % g != 0 {
        return Err(Error::Infeasible);
    }
    Ok((u, c / g))
}

/// Solves `t . U . A = c` for an integer row vector `t` of length `A.nrows()`, where
/// `A` is `m x s` and `c` has length `s`.
///
/// Returns `(U, t, rank_s)`: `U` is a unimodular `m x m` matrix, `t` is a row vector
/// whose first `rank_s` components are determined and whose remaining
/// `m - rank_s` components are free parameters (left as `0` placeholders — callers
/// substitute any integers there), and `rank_s` is the column rank of `A` after
/// Hermite reduction. For any integer choice of the free tail, `t . U . A == c`.
///
/// Algorithm: process the columns of `A` (each column is one scalar equation) with
/// [`solve_one_equation`], projecting each column through the transform accumulated
/// so far (`U_k . a_col`) and folding the next equation's unimodular transform into a
/// growing `U` by left-multiplying a block-identity embedding — the already-fixed
/// prefix of `t` is left untouched by every later fold, since the embedding only acts
/// on the rows/columns of the as-yet-free tail.
pub fn solve_system(a: &Matrix, c: &RowVector) -> Result<(Matrix, RowVector, usize)> {
    let m = a.nrows();
    let s = a.ncols();
    assert_eq!(c.len(), s, "right-hand side length must equal the number of columns");

    let mut u_total = Matrix::identity(m);
    let mut t = vec![0 as Scalar; m];
    let mut rank = 0usize;

    for col in 0..s {
        let a_col = a.column(col);
        let a_proj = u_total.mul_col(&a_col);
        let fixed_contrib: Wide =
            (0..rank).map(|k| t[k] as Wide * a_proj[k] as Wide).sum();
        let target_wide = c[col] as Wide - fixed_contrib;

        let tail = a_proj.slice(rank, m);
        if tail.is_zero() {
            if target_wide != 0 {
                return Err(Error::Infeasible);
            }
            continue;
        }

        let target = narrow(target_wide, "solve_system right-hand side")?;
        let (u_sub, t1) = solve_one_equation(&tail, target)?;

        let mut embed = Matrix::identity(m);
        for r in 0..u_sub.nrows() {
            for cc in 0..u_sub.ncols() {
                embed.set(rank + r, rank + cc, u_sub.get(r, cc));
            }
        }
        u_total = embed.checked_mul(&u_total)?;
        t[rank] = t1;
        rank += 1;
    }

    Ok((u_total, RowVector::new(t), rank))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_tail(len: usize, seed: &mut u64) -> Vec<Scalar> {
        (0..len)
            .map(|_| {
                *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((*seed >> 33) % 41) as Scalar - 20
            })
            .collect()
    }

    #[test]
    fn one_equation_divisible() {
        let a = RowVector::new(vec![10, 14]);
        assert!(solve_one_equation(&a, 15).is_err());
        let (u, t1) = solve_one_equation(&a, 8).unwrap();
        let ua = u.mul_col(&a);
        let mut seed = 12345u64;
        for _ in 0..20 {
            let mut t = vec![t1];
            t.extend(random_tail(a.len() - 1, &mut seed));
            let t = RowVector::new(t);
            assert_eq!(t.dot_wide(&ua), 8);
        }
    }

    #[test]
    fn one_equation_examples_from_scenario_5() {
        assert!(solve_one_equation(&RowVector::new(vec![4, 6, 4]), 8).is_ok());
        assert!(solve_one_equation(&RowVector::new(vec![3, -3]), 6).is_ok());
        assert!(solve_one_equation(&RowVector::new(vec![10, 14]), 15).is_err());
        assert!(solve_one_equation(&RowVector::new(vec![55, -89, 41]), 17).is_ok());
        assert!(solve_one_equation(&RowVector::new(vec![14, 21, -35, 28]), -42).is_ok());
    }

    fn check_system(a: &Matrix, c: &RowVector, has_solution: bool) {
        let result = solve_system(a, c);
        assert_eq!(result.is_ok(), has_solution);
        let Ok((u, t, rank_s)) = result else { return };
        let mut seed = 98765u64;
        for _ in 0..20 {
            let mut full = t.as_slice()[..rank_s].to_vec();
            full.extend(random_tail(a.nrows() - rank_s, &mut seed));
            let full = RowVector::new(full);
            for col in 0..a.ncols() {
                let ua = u.mul_col(&a.column(col));
                assert_eq!(full.dot_wide(&ua), c[col] as Wide);
            }
        }
    }

    #[test]
    fn system_examples_from_scenario_5_and_original_source() {
        check_system(
            &Matrix::new(4, 3, vec![2, 1, 0, 6, 3, -2, 4, 0, 3, -2, 5, -1]),
            &RowVector::new(vec![4, 2, 8]),
            true,
        );
        check_system(
            &Matrix::new(2, 2, vec![3, 10, -3, 14]),
            &RowVector::new(vec![6, 15]),
            false,
        );
        check_system(
            &Matrix::new(3, 2, vec![3, 55, 14, -89, 0, 41]),
            &RowVector::new(vec![15, 17]),
            true,
        );
        check_system(
            &Matrix::new(4, 3, vec![1, -2, 5, 3, -1, 2, -2, 1, 0, 1, 2, -3]),
            &RowVector::new(vec![5, 8, 8]),
            true,
        );
    }

    #[test]
    fn system_with_no_equations_is_fully_free() {
        let a = Matrix::new(3, 0, vec![]);
        let c = RowVector::new(vec![]);
        let (_u, _t, rank_s) = solve_system(&a, &c).unwrap();
        assert_eq!(rank_s, 0);
    }
}
