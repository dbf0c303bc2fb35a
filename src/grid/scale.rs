//! Regular (rank-2) scales on the lattice
//!
//! A scale system `(a, b)` describes a period built from `a` steps of `(1,0)`
//! and `b` steps of `(0,1)`, so the scale has `n = a + b` notes per period.
//! The mode selects which rotation of the step pattern is played. Scale
//! degrees are numbered in pitch order, degree `s` sitting on the lattice
//! point with `x + y = s`.

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::lattice::{gcd, modular_inverse, LatticeVector};
use super::tuning::ConsistentTuning;

const SHARP: char = '♯';
const FLAT: char = '♭';

/// A regular scale: scale system plus mode
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegularScale {
    scale_system: LatticeVector,
    mode: i32,
    n: i32,
    inverse_of_x: i32,
}

impl Default for RegularScale {
    /// Diatonic major
    fn default() -> Self {
        Self {
            scale_system: LatticeVector::new(2, 5),
            mode: 1,
            n: 7,
            inverse_of_x: 4,
        }
    }
}

/// One note of the scale, in pitch order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleDegree {
    /// Degree index, 0 for the tonic
    pub seq_nr: i32,
    /// Lattice point of the degree
    pub coord: LatticeVector,
    /// Canonical name, e.g. `♭3`
    pub name: String,
    /// Size above the tonic in cents
    pub cents: f32,
    /// Closest just ratio, see [`super::rational::ratio_label`]
    pub ratio: String,
    /// 1V/oct output, offset included
    pub voltage: f32,
}

impl RegularScale {
    /// Create a scale; `mode` is clamped into `[0, n-1]`
    pub fn new(scale_system: LatticeVector, mode: i32) -> Result<Self> {
        let mut scale = Self::default();
        scale.set_scale_system(scale_system)?;
        scale.set_mode(mode);
        Ok(scale)
    }

    /// Whether `v` has coprime components
    pub fn is_coprime_scale_vector(v: LatticeVector) -> bool {
        gcd(v.x, v.y) == 1
    }

    /// Change the scale system, re-clamping the mode.
    ///
    /// Rejects systems with a negative component, an empty period, or
    /// non-coprime components; the scale is unchanged on error.
    pub fn set_scale_system(&mut self, v: LatticeVector) -> Result<()> {
        if v.x < 0 || v.y < 0 || v.x + v.y <= 0 {
            return Err(Error::InvalidScaleSystem(v));
        }
        if !Self::is_coprime_scale_vector(v) {
            return Err(Error::NonCoprimeScaleSystem(v));
        }
        let n = v.x + v.y;
        // gcd(x, x + y) == gcd(x, y) == 1
        let inverse_of_x = modular_inverse(v.x, n).ok_or(Error::NonCoprimeScaleSystem(v))?;

        self.scale_system = v;
        self.n = n;
        self.inverse_of_x = inverse_of_x;
        self.mode = self.mode.clamp(0, n - 1);
        Ok(())
    }

    /// Set the mode, clamped into `[0, n-1]`
    pub fn set_mode(&mut self, mode: i32) {
        self.mode = mode.clamp(0, self.n - 1);
    }

    /// Large and small step counts `(a, b)`
    pub fn scale_system(&self) -> LatticeVector {
        self.scale_system
    }

    /// Mode index in `0..n`
    pub fn mode(&self) -> i32 {
        self.mode
    }

    /// Number of notes per period
    pub fn n(&self) -> i32 {
        self.n
    }

    /// Inverse of `b` modulo `n`, used for degree numbers
    pub fn inverse_of_x(&self) -> i32 {
        self.inverse_of_x
    }

    /// Lattice point of scale degree `seq_nr`.
    ///
    /// Walks the period vector in `n` equal parts and drops to the lattice:
    /// `x = floor((a·s + mode) / n)` and `y = s - x`. Negative or large
    /// `seq_nr` lands in other periods.
    pub fn scale_note_seq_nr_to_coord(&self, seq_nr: i32) -> LatticeVector {
        let x = (self.scale_system.x * seq_nr + self.mode).div_euclid(self.n);
        LatticeVector::new(x, seq_nr - x)
    }

    /// Scale degree of `c` within its period, or `None` if `c` is not in the scale
    pub fn coord_to_scale_note_seq_nr(&self, c: LatticeVector) -> Option<i32> {
        let d = c.x * self.scale_system.y - c.y * self.scale_system.x + (self.n - (self.mode + 1));
        if d < 0 || d >= self.n {
            return None;
        }
        Some((c.x + c.y).rem_euclid(self.n))
    }

    /// Canonical name of `c`: accidentals followed by the 1-based diatonic number.
    ///
    /// Which accidental means "raised" follows the tuning: when `(1,0)` is
    /// tuned above `(0,1)` sharps and flats trade places.
    pub fn canonical_name_for_coord(&self, c: LatticeVector, tuning: &ConsistentTuning) -> String {
        let (a, b, n) = (
            self.scale_system.x as i64,
            self.scale_system.y as i64,
            self.n as i64,
        );
        let d = -(c.x as i64 * b - c.y as i64 * a);
        let number = (self.inverse_of_x as i64 * d).rem_euclid(n) + 1;
        let mut accidentals = (d + 1).div_euclid(n);
        if tuning.x_axis_is_higher() {
            accidentals = -accidentals;
        }

        let symbol = if accidentals > 0 { SHARP } else { FLAT };
        let mut name: String = std::iter::repeat(symbol)
            .take(accidentals.unsigned_abs() as usize)
            .collect();
        name.push_str(&number.to_string());
        name
    }

    /// The `n` degrees of the first period, with names and pitches under `tuning`
    pub fn degrees(&self, tuning: &ConsistentTuning) -> Vec<ScaleDegree> {
        (0..self.n)
            .map(|seq_nr| {
                let coord = self.scale_note_seq_nr_to_coord(seq_nr);
                let ratio = tuning.vec_to_freq_ratio_no_offset(coord);
                ScaleDegree {
                    seq_nr,
                    coord,
                    name: self.canonical_name_for_coord(coord, tuning),
                    cents: tuning.vec_to_cents(coord),
                    ratio: super::rational::ratio_label(ratio, 5.0 * self.n as f64),
                    voltage: tuning.vec_to_voltage(coord),
                }
            })
            .collect()
    }
}
