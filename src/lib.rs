/*!
A static data-dependence analyzer and unimodular loop-transformation engine for
perfectly nested affine loops.

Given a loop nest whose bounds are affine functions of the outer loop indices and two
array references whose subscripts are affine functions of the loop indices, this crate
decides whether a data dependence exists between them, enumerates the directions and
distances of those dependences, and — when possible — synthesizes a unimodular
(integer, determinant `±1`) matrix that re-coordinates the iteration space so that
either a maximal prefix of outermost loops becomes dependence-free, or every dependence
is concentrated onto a single loop, freeing the rest.


# Example

Two references into the same two-dimensional array, `A[I1 + 1, I2]` in statement `S`
and `A[J1, J2 + 2]` in statement `T`, both statements independently ranging over the
nest `0 <= x1, x2 <= 9`:

```
use unimodular_dependence::{dependence, matrix::{Matrix, RowVector}};

let a = Matrix::new(2, 2, vec![1, 0, 0, 1]);
let a0 = RowVector::new(vec![1, 0]);
let b = Matrix::new(2, 2, vec![1, 0, 0, 1]);
let b0 = RowVector::new(vec![0, 2]);

let p = Matrix::new(2, 2, vec![1, 0, 0, 1]);
let p0 = RowVector::new(vec![0, 0]);
let q = Matrix::new(2, 2, vec![-1, 0, 0, -1]);
let q0 = RowVector::new(vec![9, 9]);

let (t_on_s, s_on_t) = dependence::general_linear_dependence_test(
    &a, &a0, &b, &b0, &p, &p0, &q, &q0, dependence::Options::default(),
).unwrap();
```

Once the dependence distances for a nest are known, [`transform::find_outer_loop_transform_matrix`]
or [`transform::find_inner_loop_transform_matrix`] picks a parallelization strategy, and
[`transform::calculate_transformed_nest_limits`] re-expresses the original bounds for the
transformed iteration order.


# Module map

- [`matrix`] — exact-integer `Matrix`/`RowVector` kernel: arithmetic, rank, Hermite
  column reduction, determinant, lexicographic compare.
- [`diophantine`] — single-equation and system solvers over the integers, each
  returning a unimodular parameterization of its solution set.
- [`fourier_motzkin`] — exact rational Fourier-Motzkin elimination and integer-point
  enumeration of the resulting bound tower.
- [`dependence`] — the two dependence tests built on top of the above.
- [`transform`] — unimodular transform synthesis and transformed bound computation.

Every fallible entry point returns [`error::Result`]; see [`error::Error`] for the
single error enum shared across the whole crate.
*/

pub mod matrix;
pub mod error;
pub mod diophantine;
pub mod fourier_motzkin;
pub mod dependence;
pub mod transform;

pub use dependence::{general_linear_dependence_test, uniform_linear_dependence_test, DependenceInfo, Options};
pub use error::{Error, Result};
pub use transform::{
    calculate_transformed_nest_limits, find_inner_loop_transform_matrix, find_outer_loop_transform_matrix,
};
