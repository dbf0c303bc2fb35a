//! Lattice tuning engine for isomorphic hex keyboards.
//!
//! Scale positions live on a rank-2 integer lattice. A [`ConsistentTuning`]
//! assigns frequency ratios to two lattice vectors and derives every other
//! pitch from them, a [`RegularScale`] picks out the notes of a mode, and the
//! [`KeyboardLatticeMapper`] relates physical keys to lattice points. The
//! [`datalink`] module ships the tuning state between processing units over
//! a single sample-rate channel.

#![warn(missing_docs)]

pub mod datalink;
pub mod grid;
pub mod keyboard;
pub mod session;
pub mod voct;
pub mod wav;

pub use datalink::{TuningDataReceiver, TuningDataSender, TuningSnapshot};
pub use grid::{
    ConsistentTuning, Error, KeyboardLatticeMapper, LatticeMatrix, LatticeVector, RegularScale, Result,
    TuningPreset,
};
pub use session::TuningSession;
pub use voct::BlackKeyMap;

/// Sample rate of recorded data-link streams (in Hz)
pub const SAMPLE_RATE: u32 = 48000;
