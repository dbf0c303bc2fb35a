//! The lattice tuning engine: integer lattice algebra, tunings, scales and
//! the keyboard mapping.

pub mod error;
pub mod lattice;
pub mod mapper;
pub mod rational;
pub mod scale;
pub mod tuning;

pub use error::{Error, Result};
pub use lattice::{LatticeMatrix, LatticeVector, ZERO_VECTOR};
pub use mapper::KeyboardLatticeMapper;
pub use rational::{closest_rational, Fraction};
pub use scale::{RegularScale, ScaleDegree};
pub use tuning::{ConsistentTuning, TuningPreset};
