//! Error types for the lattice tuning engine.

use thiserror::Error;

use super::lattice::LatticeVector;

/// Result type for lattice, tuning and scale operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when a caller hands the engine an unusable lattice or scale.
///
/// All of these are caller contract violations. They are reported at the call
/// that introduced the bad input, and the callee keeps its previous state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two lattice vectors that should span the plane are linearly dependent.
    #[error("degenerate lattice basis {a} / {b}: determinant is zero")]
    DegenerateLattice {
        /// First basis vector.
        a: LatticeVector,
        /// Second basis vector.
        b: LatticeVector,
    },

    /// The integer transform mapping one basis onto another is not integral.
    #[error("no integer transform maps {a} -> {x} and {b} -> {y} (determinant {det} does not divide)")]
    InexactTransform {
        /// First source vector.
        a: LatticeVector,
        /// Image of `a`.
        x: LatticeVector,
        /// Second source vector.
        b: LatticeVector,
        /// Image of `b`.
        y: LatticeVector,
        /// Determinant of the source basis.
        det: i64,
    },

    /// Scale system components share a common factor, so scale-degree naming is undefined.
    #[error("scale system {0} is not coprime")]
    NonCoprimeScaleSystem(LatticeVector),

    /// Scale system has a negative component or zero cardinality.
    #[error("scale system {0} must have nonnegative components and a positive size")]
    InvalidScaleSystem(LatticeVector),

    /// Frequency ratio is not a positive finite number.
    #[error("invalid frequency ratio: {0}")]
    InvalidRatio(f32),

    /// Integer overflow while solving for a transform.
    #[error("integer overflow in lattice transform")]
    Overflow,
}
