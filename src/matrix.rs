/*!

Exact-integer matrix and row-vector kernel.

Every value type in this module owns its storage; there is no shared mutable state and
no floating point anywhere in the arithmetic. Scalars are `i64` (`Scalar`) on the public
surface; elementary operations that can grow coefficients (extended GCD folding during
Hermite reduction) work in `i128` (`Wide`) internally and narrow back, reporting
[`Error::Overflow`] rather than wrapping or truncating silently.

*/

use std::cmp::Ordering;
use std::ops::{Add, Index, Mul, Neg, Sub};

use crate::error::{Error, Result};

/// Public scalar type. All matrix and vector entries are `Scalar`.
pub type Scalar = i64;

/// Widened scalar used for intermediate arithmetic that could overflow `Scalar`
/// (extended-GCD folding, Hermite column reduction, determinants).
pub type Wide = i128;

fn narrow(w: Wide, context: &str) -> Result<Scalar> {
    Scalar::try_from(w).map_err(|_| Error::Overflow(context.to_string()))
}

/// The result of comparing two equal-length vectors lexicographically.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LexOrder {
    /// The left vector is lexicographically greater.
    LeftGreater,
    /// The right vector is lexicographically greater.
    RightGreater,
    /// The vectors are equal.
    Equal,
}

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g` and
/// `g = gcd(|a|, |b|) >= 0`.
pub(crate) fn ext_gcd(a: Wide, b: Wide) -> (Wide, Wide, Wide) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);

    while r != 0 {
        let q = old_r / r;
        let (new_r, new_s, new_t) = (old_r - q * r, old_s - q * s, old_t - q * t);
        old_r = r;
        r = new_r;
        old_s = s;
        s = new_s;
        old_t = t;
        t = new_t;
    }

    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// `gcd` of a slice of integers; `gcd of an empty slice or all-zero slice is 0`.
pub(crate) fn gcd_many(values: &[Wide]) -> Wide {
    values.iter().fold(0i128, |acc, &v| ext_gcd(acc, v).0)
}

/// A row vector of `Scalar`s: a loop-index tuple, a subscript/distance vector, or one
/// row of a `Bound`'s coefficient matrix.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RowVector {
    data: Vec<Scalar>,
}

impl RowVector {
    /// Builds a row vector from explicit entries.
    pub fn new(data: Vec<Scalar>) -> Self {
        RowVector { data }
    }

    /// The zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        RowVector { data: vec![0; n] }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this vector has zero length.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the components as a slice.
    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0)
    }

    /// Dot product, widened to avoid overflow on the accumulation.
    pub fn dot_wide(&self, other: &RowVector) -> Wide {
        assert_eq!(self.len(), other.len(), "dot product requires equal-length vectors");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a as Wide * b as Wide)
            .sum()
    }

    /// Componentwise sign: `{-1, 0, +1}` per component.
    pub fn signum(&self) -> RowVector {
        RowVector::new(self.data.iter().map(|&x| x.signum()).collect())
    }

    /// 1-based index of the first nonzero component; `len() + 1` for the zero vector
    /// (conventionally "loop-independent" within an `m`-deep nest when `len() == m`).
    pub fn level(&self) -> usize {
        self.data
            .iter()
            .position(|&x| x != 0)
            .map(|idx| idx + 1)
            .unwrap_or(self.len() + 1)
    }

    /// Total lexicographic order over equal-length vectors.
    pub fn compare_lex(&self, other: &RowVector) -> LexOrder {
        assert_eq!(self.len(), other.len(), "lexicographic compare requires equal-length vectors");
        for (&a, &b) in self.data.iter().zip(other.data.iter()) {
            match a.cmp(&b) {
                Ordering::Greater => return LexOrder::LeftGreater,
                Ordering::Less => return LexOrder::RightGreater,
                Ordering::Equal => continue,
            }
        }
        LexOrder::Equal
    }

    /// `self <=lex other`.
    pub fn is_lex_le(&self, other: &RowVector) -> bool {
        matches!(self.compare_lex(other), LexOrder::RightGreater | LexOrder::Equal)
    }

    /// Concatenation `[self | other]`.
    pub fn concat(&self, other: &RowVector) -> RowVector {
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        RowVector::new(data)
    }

    /// The sub-vector `self[range]`.
    pub fn slice(&self, start: usize, end: usize) -> RowVector {
        RowVector::new(self.data[start..end].to_vec())
    }

    /// Scale every component by `k`, checked against `Scalar` overflow.
    pub fn checked_scale(&self, k: Scalar) -> Result<RowVector> {
        let mut out = Vec::with_capacity(self.len());
        for &x in &self.data {
            out.push(narrow(x as Wide * k as Wide, "row vector scale")?);
        }
        Ok(RowVector::new(out))
    }
}

impl Index<usize> for RowVector {
    type Output = Scalar;
    fn index(&self, idx: usize) -> &Scalar {
        &self.data[idx]
    }
}

impl Add for &RowVector {
    type Output = RowVector;
    fn add(self, other: &RowVector) -> RowVector {
        assert_eq!(self.len(), other.len());
        RowVector::new(self.data.iter().zip(&other.data).map(|(&a, &b)| a + b).collect())
    }
}

impl Sub for &RowVector {
    type Output = RowVector;
    fn sub(self, other: &RowVector) -> RowVector {
        assert_eq!(self.len(), other.len());
        RowVector::new(self.data.iter().zip(&other.data).map(|(&a, &b)| a - b).collect())
    }
}

impl Neg for &RowVector {
    type Output = RowVector;
    fn neg(self) -> RowVector {
        RowVector::new(self.data.iter().map(|&a| -a).collect())
    }
}

impl Mul<Scalar> for &RowVector {
    type Output = RowVector;
    fn mul(self, k: Scalar) -> RowVector {
        RowVector::new(self.data.iter().map(|&a| a * k).collect())
    }
}

/// A dense integer matrix, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Scalar>,
}

impl Matrix {
    /// Builds a matrix from row-major data. Panics if `data.len() != rows * cols`
    /// (a dimension mismatch here is always a programmer error at the call site).
    pub fn new(rows: usize, cols: usize, data: Vec<Scalar>) -> Self {
        assert_eq!(data.len(), rows * cols, "matrix data length does not match dimensions");
        Matrix { rows, cols, data }
    }

    /// The `rows x cols` zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix { rows, cols, data: vec![0; rows * cols] }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    /// Builds a matrix by stacking row vectors, all of which must share a length.
    pub fn from_rows(rows: &[RowVector]) -> Self {
        let r = rows.len();
        let c = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(r * c);
        for row in rows {
            assert_eq!(row.len(), c, "all rows must share a length");
            data.extend_from_slice(row.as_slice());
        }
        Matrix::new(r, c, data)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Element access.
    pub fn get(&self, r: usize, c: usize) -> Scalar {
        self.data[r * self.cols + c]
    }

    /// Element mutation.
    pub fn set(&mut self, r: usize, c: usize, v: Scalar) {
        self.data[r * self.cols + c] = v;
    }

    /// The `r`-th row, as a [`RowVector`].
    pub fn row(&self, r: usize) -> RowVector {
        RowVector::new(self.data[r * self.cols..(r + 1) * self.cols].to_vec())
    }

    /// The `c`-th column, as a [`RowVector`] of length `nrows()`.
    pub fn column(&self, c: usize) -> RowVector {
        RowVector::new((0..self.rows).map(|r| self.get(r, c)).collect())
    }

    /// Transpose.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }

    /// `self + other`, assumes equal dimensions.
    pub fn add(&self, other: &Matrix) -> Matrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        Matrix::new(self.rows, self.cols, self.data.iter().zip(&other.data).map(|(&a, &b)| a + b).collect())
    }

    /// `self - other`, assumes equal dimensions.
    pub fn sub(&self, other: &Matrix) -> Matrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        Matrix::new(self.rows, self.cols, self.data.iter().zip(&other.data).map(|(&a, &b)| a - b).collect())
    }

    /// Negation.
    pub fn neg(&self) -> Matrix {
        Matrix::new(self.rows, self.cols, self.data.iter().map(|&a| -a).collect())
    }

    /// Scalar multiplication.
    pub fn scale(&self, k: Scalar) -> Matrix {
        Matrix::new(self.rows, self.cols, self.data.iter().map(|&a| a * k).collect())
    }

    /// `self * other`, widened internally, narrowed back with an overflow check.
    pub fn checked_mul(&self, other: &Matrix) -> Result<Matrix> {
        assert_eq!(self.cols, other.rows, "matrix multiplication requires self.cols == other.rows");
        let mut data = Vec::with_capacity(self.rows * other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc: Wide = 0;
                for k in 0..self.cols {
                    acc += self.get(r, k) as Wide * other.get(k, c) as Wide;
                }
                data.push(narrow(acc, "matrix multiplication")?);
            }
        }
        Ok(Matrix::new(self.rows, other.cols, data))
    }

    /// `row * self`, i.e. `row` treated as a `1 x n` matrix.
    pub fn mul_row(&self, row: &RowVector) -> RowVector {
        assert_eq!(row.len(), self.rows, "row vector length must equal matrix row count");
        let mut out = Vec::with_capacity(self.cols);
        for c in 0..self.cols {
            let mut acc: Wide = 0;
            for k in 0..self.rows {
                acc += row[k] as Wide * self.get(k, c) as Wide;
            }
            out.push(acc as Scalar);
        }
        RowVector::new(out)
    }

    /// `self * col`, i.e. `col` treated as an `n x 1` matrix.
    pub fn mul_col(&self, col: &RowVector) -> RowVector {
        assert_eq!(col.len(), self.cols, "column vector length must equal matrix column count");
        let mut out = Vec::with_capacity(self.rows);
        for r in 0..self.rows {
            let mut acc: Wide = 0;
            for k in 0..self.cols {
                acc += self.get(r, k) as Wide * col[k] as Wide;
            }
            out.push(acc as Scalar);
        }
        RowVector::new(out)
    }

    /// Submatrix view materialized as an owned `Matrix`, `rows` and `cols` are
    /// half-open index ranges.
    pub fn submatrix(&self, row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Matrix {
        let mut data = Vec::with_capacity((row_end - row_start) * (col_end - col_start));
        for r in row_start..row_end {
            for c in col_start..col_end {
                data.push(self.get(r, c));
            }
        }
        Matrix::new(row_end - row_start, col_end - col_start, data)
    }

    /// Swap columns `i` and `j`.
    pub fn swap_columns(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + i, r * self.cols + j);
        }
    }

    /// Swap rows `i` and `j`.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(i * self.cols + c, j * self.cols + c);
        }
    }

    /// `col[dst] += k * col[src]`.
    pub fn add_scaled_column(&mut self, k: Scalar, src: usize, dst: usize) {
        for r in 0..self.rows {
            let add = k * self.get(r, src);
            let v = self.get(r, dst) + add;
            self.set(r, dst, v);
        }
    }

    /// `row[dst] += k * row[src]`.
    pub fn add_scaled_row(&mut self, k: Scalar, src: usize, dst: usize) {
        for c in 0..self.cols {
            let add = k * self.get(src, c);
            let v = self.get(dst, c) + add;
            self.set(dst, c, v);
        }
    }

    /// Replace columns `j1, j2` with `x*col_j1 + y*col_j2` and `u*col_j1 + v*col_j2`
    /// respectively (a single unimodular 2x2 column transform applied across every
    /// row). Used by [`Matrix::hermite_column_reduce`].
    fn apply_column_combination(&mut self, j1: usize, j2: usize, x: Wide, y: Wide, u: Wide, v: Wide) -> Result<()> {
        for r in 0..self.rows {
            let a = self.get(r, j1) as Wide;
            let b = self.get(r, j2) as Wide;
            let new1 = narrow(x * a + y * b, "Hermite column combination")?;
            let new2 = narrow(u * a + v * b, "Hermite column combination")?;
            self.set(r, j1, new1);
            self.set(r, j2, new2);
        }
        Ok(())
    }

    /// Rank over `Q`, computed as the number of pivot columns found by
    /// [`Matrix::hermite_column_reduce`]. Integer-preserving; never falls back to
    /// floating point. Propagates [`Error::Overflow`] if the reduction would overflow
    /// `i128`.
    pub fn rank(&self) -> Result<usize> {
        self.hermite_column_reduce().map(|(_, _, rank)| rank)
    }

    /// Column-style Hermite reduction: returns `(H, U, rank)` with `self * U = H`, `U`
    /// unimodular, and `H` in column-echelon form — the leftmost `rank` columns carry
    /// the pivots (one per row, top to bottom, each made nonnegative), and the
    /// trailing `ncols() - rank` columns are entirely zero.
    pub fn hermite_column_reduce(&self) -> Result<(Matrix, Matrix, usize)> {
        let mut h = self.clone();
        let mut u = Matrix::identity(self.cols);
        let mut pivot_col = 0usize;

        for row in 0..self.rows {
            if pivot_col >= self.cols {
                break;
            }
            // Reduce all nonzero entries of this row among columns [pivot_col, cols)
            // down to a single nonzero entry via repeated extended-GCD column folds.
            loop {
                let nonzero: Vec<usize> =
                    (pivot_col..h.cols).filter(|&c| h.get(row, c) != 0).collect();
                if nonzero.len() <= 1 {
                    break;
                }
                let (j1, j2) = (nonzero[0], nonzero[1]);
                let a = h.get(row, j1) as Wide;
                let b = h.get(row, j2) as Wide;
                let (g, x, y) = ext_gcd(a, b);
                // [a b] * [[x, -b/g], [y, a/g]] = [g, 0], determinant of the 2x2 is
                // (x*a/g - y*(-b/g)) = (x*a + y*b)/g = 1.
                let (bg, ag) = (b / g, a / g);
                h.apply_column_combination(j1, j2, x, y, -bg, ag)?;
                u.apply_column_combination(j1, j2, x, y, -bg, ag)?;
            }
            if pivot_col < h.cols {
                let nonzero: Vec<usize> =
                    (pivot_col..h.cols).filter(|&c| h.get(row, c) != 0).collect();
                if let Some(&pivot) = nonzero.first() {
                    h.swap_columns(pivot, pivot_col);
                    u.swap_columns(pivot, pivot_col);
                    if h.get(row, pivot_col) < 0 {
                        for r in 0..h.rows {
                            let v = -h.get(r, pivot_col);
                            h.set(r, pivot_col, v);
                        }
                        for r in 0..u.rows {
                            let v = -u.get(r, pivot_col);
                            u.set(r, pivot_col, v);
                        }
                    }
                    pivot_col += 1;
                }
            }
        }

        Ok((h, u, pivot_col))
    }

    /// Exact integer determinant via fraction-free (Bareiss) elimination. Panics if
    /// `self` is not square (a caller dimension error, not a runtime condition).
    pub fn determinant(&self) -> Result<Scalar> {
        assert_eq!(self.rows, self.cols, "determinant requires a square matrix");
        let n = self.rows;
        if n == 0 {
            return Ok(1);
        }
        let mut m: Vec<Vec<Wide>> =
            (0..n).map(|r| (0..n).map(|c| self.get(r, c) as Wide).collect()).collect();
        let mut sign: Wide = 1;
        let mut prev_pivot: Wide = 1;

        for k in 0..n - 1 {
            if m[k][k] == 0 {
                match (k + 1..n).find(|&r| m[r][k] != 0) {
                    Some(swap_row) => {
                        m.swap(k, swap_row);
                        sign = -sign;
                    }
                    None => return Ok(0),
                }
            }
            for i in (k + 1)..n {
                for j in (k + 1)..n {
                    let num = m[i][j] * m[k][k] - m[i][k] * m[k][j];
                    m[i][j] = num / prev_pivot;
                }
                m[i][k] = 0;
            }
            prev_pivot = m[k][k];
        }

        narrow(sign * m[n - 1][n - 1], "determinant")
    }

    /// The inverse of a unimodular matrix, computed exactly via the adjugate and
    /// `determinant = ±1`. Returns [`Error::Internal`] if `self` is not actually
    /// unimodular — this is an invariant every caller of this function in this crate
    /// is expected to have already established.
    pub fn inverse_unimodular(&self) -> Result<Matrix> {
        assert_eq!(self.rows, self.cols, "inverse requires a square matrix");
        let n = self.rows;
        let det = self.determinant()?;
        if det != 1 && det != -1 {
            return Err(Error::Internal(format!(
                "inverse_unimodular called on a matrix with determinant {det}, expected +-1"
            )));
        }
        let mut inv = Matrix::zeros(n, n);
        for r in 0..n {
            for c in 0..n {
                let minor = self.minor(r, c);
                let cofactor = minor.determinant()?;
                let signed = if (r + c) % 2 == 0 { cofactor } else { -cofactor };
                // adjugate is the transpose of the cofactor matrix, then divided by det
                inv.set(c, r, signed * det);
            }
        }
        Ok(inv)
    }

    fn minor(&self, skip_row: usize, skip_col: usize) -> Matrix {
        let n = self.rows;
        let mut data = Vec::with_capacity((n - 1) * (n - 1));
        for r in 0..n {
            if r == skip_row {
                continue;
            }
            for c in 0..n {
                if c == skip_col {
                    continue;
                }
                data.push(self.get(r, c));
            }
        }
        Matrix::new(n - 1, n - 1, data)
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;
    fn mul(self, other: &Matrix) -> Matrix {
        self.checked_mul(other).expect("matrix multiplication overflow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_gcd_satisfies_bezout() {
        for (a, b) in [(10, 14), (55, -89), (0, 7), (7, 0), (0, 0), (-21, -14)] {
            let (g, x, y) = ext_gcd(a, b);
            assert_eq!(x * a + y * b, g);
            assert!(g >= 0);
        }
    }

    #[test]
    fn level_and_signum() {
        let v = RowVector::new(vec![0, 0, -3, 5]);
        assert_eq!(v.level(), 3);
        assert_eq!(v.signum(), RowVector::new(vec![0, 0, -1, 1]));
        assert_eq!(RowVector::zeros(3).level(), 4);
    }

    #[test]
    fn compare_lex_basic() {
        let a = RowVector::new(vec![1, 2, 3]);
        let b = RowVector::new(vec![1, 2, 4]);
        assert_eq!(a.compare_lex(&b), LexOrder::RightGreater);
        assert_eq!(b.compare_lex(&a), LexOrder::LeftGreater);
        assert_eq!(a.compare_lex(&a), LexOrder::Equal);
        assert!(a.is_lex_le(&b));
        assert!(!b.is_lex_le(&a));
    }

    #[test]
    fn hermite_reduce_preserves_product() {
        let a = Matrix::new(2, 3, vec![2, 4, 6, 1, -2, 3]);
        let (h, u, _rank) = a.hermite_column_reduce().unwrap();
        let product = a.checked_mul(&u).unwrap();
        assert_eq!(product, h);
        assert_eq!(u.determinant().unwrap().abs(), 1);
    }

    #[test]
    fn rank_full_row_rank() {
        let a = Matrix::new(2, 2, vec![1, 0, 0, 1]);
        assert_eq!(a.rank().unwrap(), 2);
        let b = Matrix::new(1, 3, vec![2, 4, 6]);
        assert_eq!(b.rank().unwrap(), 1);
        let z = Matrix::new(3, 2, vec![0, 0, 0, 0, 0, 0]);
        assert_eq!(z.rank().unwrap(), 0);
    }

    #[test]
    fn determinant_known_values() {
        let a = Matrix::new(2, 2, vec![1, -1, 3, 4]);
        assert_eq!(a.determinant().unwrap(), 7);
        let identity = Matrix::identity(3);
        assert_eq!(identity.determinant().unwrap(), 1);
    }

    #[test]
    fn inverse_unimodular_round_trip() {
        let u = Matrix::new(2, 2, vec![2, 3, 3, 4]);
        assert_eq!(u.determinant().unwrap(), -1);
        let inv = u.inverse_unimodular().unwrap();
        let product = u.checked_mul(&inv).unwrap();
        assert_eq!(product, Matrix::identity(2));
    }
}
