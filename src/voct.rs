//! 12-TET 1V/oct input mapped onto the diatonic lattice
//!
//! Unlike [`crate::keyboard::key_for_voltage`], this does not go through the
//! controller's keys, so it covers the whole ±5V range. White keys land on
//! the C major degrees of the `(2,5)` system; each black key is spelled
//! either as a sharp of the note below or a flat of the note above, which
//! decides the lattice point it takes its pitch from.

use serde::{Deserialize, Serialize};

use crate::grid::{ConsistentTuning, LatticeVector};

/// Octaves below 0V that the lattice arithmetic starts from
const OCTAVES_BELOW: f32 = 5.0;

/// Spelling of the five black keys.
///
/// Sharps are handed out in circle-of-fifths order (F♯, C♯, G♯, D♯, A♯);
/// every black key not spelled sharp is a flat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum BlackKeyMap {
    /// D♭ E♭ G♭ A♭ B♭
    AllFlat,
    /// D♭ E♭ F♯ A♭ B♭
    #[default]
    FSharp,
    /// C♯ E♭ F♯ A♭ B♭
    CSharp,
    /// C♯ E♭ F♯ G♯ B♭
    GSharp,
    /// C♯ D♯ F♯ G♯ B♭
    DSharp,
    /// C♯ D♯ F♯ G♯ A♯
    AllSharp,
}

impl BlackKeyMap {
    /// All spellings, from fewest to most sharps
    pub const ALL: [BlackKeyMap; 6] = [
        BlackKeyMap::AllFlat,
        BlackKeyMap::FSharp,
        BlackKeyMap::CSharp,
        BlackKeyMap::GSharp,
        BlackKeyMap::DSharp,
        BlackKeyMap::AllSharp,
    ];

    /// Number of black keys spelled sharp
    pub fn sharps(self) -> i32 {
        self as i32
    }
}

/// Lattice point for a 12-TET voltage, 0V being middle C at `(0,0)`.
///
/// The input is quantized to the nearest semitone. `(1,0)` is the diatonic
/// semitone and `(0,1)` the whole tone, so the result `(a,b)` always has
/// `a + 2b` semitones.
pub fn voltage_to_coord(voltage: f32, map: BlackKeyMap) -> LatticeVector {
    let v = voltage + OCTAVES_BELOW;
    let spelling = (map.sharps() as f32 + 5.5) / 12.0;
    let b = (5.0 * v + spelling).floor() as i32;
    let a = (7.0 * v - spelling).ceil() as i32 - b;
    let origin = LatticeVector::new(2, 5) * OCTAVES_BELOW as i32;
    LatticeVector::new(a, b) - origin
}

/// Retuned 1V/oct output for a 12-TET input voltage
pub fn map_voltage(tuning: &ConsistentTuning, voltage: f32, map: BlackKeyMap) -> f32 {
    tuning.vec_to_voltage(voltage_to_coord(voltage, map))
}
