/*!

Fourier-Motzkin elimination over rational inequalities, and enumeration of the integer
points of the resulting polytope.

The eliminator takes a system `{ I : A . I >= -v0 }` (row `i` reads `a_i . I + v0_i >=
0`) and projects it one axis at a time, from the innermost variable to the outermost,
producing for each axis the list of affine lower and upper bounds (over the
already-fixed outer prefix) that a loop nest needs to iterate. Rational arithmetic is
used only as scratch space during a single axis's elimination step; every row handed to
the next stage, and every [`Bound`] handed back to the caller, is re-integerized by
clearing denominators and dividing through by the row's gcd.

*/

use crate::error::{Error, Result};
use crate::matrix::{ext_gcd, gcd_many, Matrix, RowVector, Scalar, Wide};

fn narrow(w: Wide, context: &str) -> Result<Scalar> {
    Scalar::try_from(w).map_err(|_| Error::Overflow(context.to_string()))
}

/// An exact rational scratch value used only inside a single elimination step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Rational {
    num: Wide,
    den: Wide,
}

impl Rational {
    fn new(num: Wide, den: Wide) -> Self {
        assert!(den != 0, "rational denominator must be nonzero");
        let sign: Wide = if den < 0 { -1 } else { 1 };
        let (mut n, mut d) = (num * sign, den * sign);
        let g = ext_gcd(n, d).0;
        if g != 0 {
            n /= g;
            d /= g;
        }
        Rational { num: n, den: d }
    }

    fn from_int(n: Wide) -> Self {
        Rational::new(n, 1)
    }

    fn is_zero(&self) -> bool {
        self.num == 0
    }

    fn add(&self, other: &Rational) -> Rational {
        Rational::new(self.num * other.den + other.num * self.den, self.den * other.den)
    }

    fn neg(&self) -> Rational {
        Rational { num: -self.num, den: self.den }
    }

    fn div_by(&self, other: &Rational) -> Rational {
        Rational::new(self.num * other.den, self.den * other.num)
    }
}

fn lcm(a: Wide, b: Wide) -> Wide {
    if a == 0 || b == 0 {
        return 0;
    }
    let g = ext_gcd(a, b).0;
    (a / g * b).abs()
}

/// A row reduced to plain integers: `coeffs` over the currently-live variables plus a
/// trailing constant, representing `coeffs . I + constant >= 0`.
#[derive(Clone, Debug)]
struct IntRow {
    coeffs: Vec<Scalar>,
    constant: Scalar,
}

/// Clears denominators (multiplying through the LCM) and divides by the gcd of the
/// resulting integers, producing the canonical integer row for `coeffs . I + constant
/// >= 0`.
fn integerize(coeffs: &[Rational], constant: &Rational) -> Result<IntRow> {
    let mut l: Wide = 1;
    for r in coeffs.iter().chain(std::iter::once(constant)) {
        l = lcm(l, r.den);
        if l == 0 {
            l = 1;
        }
    }
    let scaled: Vec<Wide> = coeffs.iter().map(|r| r.num * (l / r.den)).collect();
    let scaled_constant = constant.num * (l / constant.den);

    let mut all = scaled.clone();
    all.push(scaled_constant);
    let g = gcd_many(&all);
    let g = if g == 0 { 1 } else { g };

    let coeffs = scaled
        .iter()
        .map(|&v| narrow(v / g, "Fourier-Motzkin row integerization"))
        .collect::<Result<Vec<Scalar>>>()?;
    let constant = narrow(scaled_constant / g, "Fourier-Motzkin row integerization")?;
    Ok(IntRow { coeffs, constant })
}

/// One affine lower or upper bound on a loop index: the value is
/// `coeffs . outer_prefix + k`, where `outer_prefix` holds the already-fixed values of
/// the strictly-outer loop indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bound {
    /// Coefficients over the outer prefix.
    pub coeffs: RowVector,
    /// The constant term.
    pub k: Scalar,
}

impl Bound {
    /// Builds a bound from its coefficients and constant.
    pub fn new(coeffs: RowVector, k: Scalar) -> Self {
        Bound { coeffs, k }
    }

    /// Evaluates this bound at a concrete outer prefix.
    pub fn evaluate(&self, outer_prefix: &RowVector) -> Scalar {
        assert_eq!(
            self.coeffs.len(),
            outer_prefix.len(),
            "bound coefficient length must match the outer prefix length"
        );
        (self.coeffs.dot_wide(outer_prefix) + self.k as Wide) as Scalar
    }
}

fn row_to_bound(coeffs: &[Rational], constant: &Rational) -> Result<Bound> {
    let row = integerize(coeffs, constant)?;
    Ok(Bound::new(RowVector::new(row.coeffs), row.constant))
}

/// Projects the polytope `{ I : A . I >= -v0 }` onto each axis, producing, for every
/// axis `k` from `0` to `A.ncols() - 1`, the list of lower and upper affine bounds on
/// `I[k]` over the prefix `I[0..k]`.
///
/// `row_cap` bounds the number of inequality rows carried between elimination stages
/// (Fourier-Motzkin is worst-case doubly-exponential in the row count); exceeding it
/// is reported as [`Error::ResourceCap`] rather than left to run unbounded.
pub fn project(a: &Matrix, v0: &RowVector, row_cap: usize) -> Result<(Vec<Vec<Bound>>, Vec<Vec<Bound>>)> {
    let n = a.ncols();
    let r = a.nrows();
    assert_eq!(v0.len(), r, "v0 length must equal the number of rows of a");

    let mut rows: Vec<IntRow> = (0..r)
        .map(|i| IntRow { coeffs: (0..n).map(|j| a.get(i, j)).collect(), constant: v0[i] })
        .collect();

    let mut lower: Vec<Vec<Bound>> = vec![Vec::new(); n];
    let mut upper: Vec<Vec<Bound>> = vec![Vec::new(); n];

    for k in (0..n).rev() {
        let mut pos: Vec<(Vec<Rational>, Rational)> = Vec::new();
        let mut neg: Vec<(Vec<Rational>, Rational)> = Vec::new();
        let mut next_rows: Vec<IntRow> = Vec::new();

        for row in &rows {
            let coef = row.coeffs[k];
            if coef == 0 {
                let mut coeffs = row.coeffs.clone();
                coeffs.truncate(k);
                next_rows.push(IntRow { coeffs, constant: row.constant });
                continue;
            }
            let sign: Wide = if coef > 0 { 1 } else { -1 };
            let denom = Rational::from_int(coef as Wide * sign);
            let coeffs: Vec<Rational> = row.coeffs[..k]
                .iter()
                .map(|&c| Rational::from_int(c as Wide).div_by(&denom))
                .collect();
            let constant = Rational::from_int(row.constant as Wide).div_by(&denom);
            if coef > 0 {
                pos.push((coeffs, constant));
            } else {
                neg.push((coeffs, constant));
            }
        }

        for (coeffs, constant) in &pos {
            // I[k] + coeffs.prefix + constant >= 0  =>  I[k] >= -coeffs.prefix - constant
            let neg_coeffs: Vec<Rational> = coeffs.iter().map(Rational::neg).collect();
            lower[k].push(row_to_bound(&neg_coeffs, &constant.neg())?);
        }
        for (coeffs, constant) in &neg {
            // -I[k] + coeffs.prefix + constant >= 0  =>  I[k] <= coeffs.prefix + constant
            upper[k].push(row_to_bound(coeffs, constant)?);
        }

        for (pc, pk) in &pos {
            for (nc, nk) in &neg {
                let coeffs: Vec<Rational> = pc.iter().zip(nc).map(|(a, b)| a.add(b)).collect();
                let constant = pk.add(nk);
                let row = integerize(&coeffs, &constant)?;
                if row.coeffs.iter().all(|&c| c == 0) && row.constant < 0 {
                    return Err(Error::Infeasible);
                }
                next_rows.push(row);
            }
        }

        if next_rows.len() > row_cap {
            return Err(Error::ResourceCap {
                cap: row_cap,
                context: format!("Fourier-Motzkin row count at elimination level {k}"),
            });
        }
        rows = next_rows;
    }

    for row in &rows {
        if row.coeffs.iter().all(|&c| c == 0) && row.constant < 0 {
            return Err(Error::Infeasible);
        }
    }

    Ok((lower, upper))
}

fn level_bounds(k: usize, prefix: &RowVector, lower: &[Vec<Bound>], upper: &[Vec<Bound>]) -> Result<(Scalar, Scalar)> {
    if lower[k].is_empty() || upper[k].is_empty() {
        return Err(Error::Degenerate(format!("loop level {k} has no lower or upper bound")));
    }
    let lo = lower[k].iter().map(|b| b.evaluate(prefix)).max().unwrap();
    let hi = upper[k].iter().map(|b| b.evaluate(prefix)).min().unwrap();
    Ok((lo, hi))
}

fn enumerate_rec(
    k: usize,
    prefix: &RowVector,
    lower: &[Vec<Bound>],
    upper: &[Vec<Bound>],
    cap: usize,
    count: &mut usize,
) -> Result<Vec<RowVector>> {
    let n = lower.len();
    if k == n {
        return Ok(vec![prefix.clone()]);
    }
    let (lo, hi) = level_bounds(k, prefix, lower, upper)?;
    let mut out = Vec::new();
    let mut i = lo;
    while i <= hi {
        *count += 1;
        if *count > cap {
            return Err(Error::ResourceCap { cap, context: "integer point enumeration".to_string() });
        }
        let mut data = prefix.as_slice().to_vec();
        data.push(i);
        out.extend(enumerate_rec(k + 1, &RowVector::new(data), lower, upper, cap, count)?);
        i += 1;
    }
    Ok(out)
}

/// Enumerates every integer point of the polytope described by `lower`/`upper`
/// (as returned by [`project`]), grouped by the outermost coordinate `I[0]` (the
/// grouping is observable: callers that only need a flat count can `.flatten()`).
///
/// `cap` bounds the total number of vectors enumerated across every level combined;
/// exceeding it is reported as [`Error::ResourceCap`] rather than silently truncated.
/// An axis with no lower or no upper bound at some prefix is reported as
/// [`Error::Degenerate`] (an unbounded domain cannot be enumerated).
pub fn enumerate_integer_solutions(
    lower: &[Vec<Bound>],
    upper: &[Vec<Bound>],
    cap: usize,
) -> Result<Vec<Vec<RowVector>>> {
    let n = lower.len();
    assert_eq!(upper.len(), n, "lower and upper bound lists must have the same length");
    if n == 0 {
        return Ok(vec![vec![RowVector::zeros(0)]]);
    }

    let empty = RowVector::zeros(0);
    let (lo, hi) = level_bounds(0, &empty, lower, upper)?;

    let mut groups = Vec::new();
    let mut count = 0usize;
    let mut i0 = lo;
    while i0 <= hi {
        count += 1;
        if count > cap {
            return Err(Error::ResourceCap { cap, context: "integer point enumeration".to_string() });
        }
        let prefix = RowVector::new(vec![i0]);
        groups.push(enumerate_rec(1, &prefix, lower, upper, cap, &mut count)?);
        i0 += 1;
    }
    Ok(groups)
}
