/*!

The single error type returned by every fallible entry point in this crate.

*/

use thiserror::Error;

/// Errors produced by the integer linear algebra, Diophantine, Fourier-Motzkin,
/// dependence and unimodular-transform subsystems.
///
/// There is deliberately one error enum for the whole crate (mirroring the single
/// `Result` a driver has to match on) rather than one per module; the module a
/// variant originates from is visible from its message, not from a type split.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// The queried Diophantine equation or system, or Fourier-Motzkin polytope, has
    /// no solution. Distinguishable from "the call failed": higher-level entry points
    /// (`dependence::*`) fold this into `Ok` with an empty dependence list, since "no
    /// dependence" is a legitimate answer, not a failure.
    #[error("no integer solution exists")]
    Infeasible,

    /// Inputs violate a precondition the algorithm requires to proceed (a
    /// scalar-reference case with rank-zero coefficient matrices over a nontrivial
    /// nest, an empty distance set passed to a transform that requires one, etc.).
    /// Never conflated with "no dependence" or "no solution".
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// An intermediate integer computation exceeded the representable range (`i128`
    /// during Hermite/extended-GCD folding, or `i64` on the public surface).
    #[error("integer overflow: {0}")]
    Overflow(String),

    /// Fourier-Motzkin row explosion, or integer enumeration, exceeded the
    /// caller-configured cap. The core returns no partial result.
    #[error("resource cap of {cap} exceeded: {context}")]
    ResourceCap {
        /// The cap that was exceeded.
        cap: usize,
        /// What was being enumerated when the cap was hit.
        context: String,
    },

    /// An invariant this crate is responsible for establishing was violated (for
    /// example a computed transform matrix with determinant not in `{-1, 1}`). This
    /// is a bug in this crate, not a caller error, and must never be downgraded to
    /// silently-wrong dependence data.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
