//! Consistent tunings of the scale lattice
//!
//! Two linearly independent lattice vectors get a frequency ratio each; every
//! other lattice point is tuned by solving for its coordinates in that basis.
//! Voltages follow 1V/octave with 0V at middle C.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::lattice::{det, LatticeVector};

/// Frequency of 0V: middle C relative to A4 = 440 Hz (440 · 2^(-9/12))
pub const REFERENCE_FREQ: f32 = 261.625_57;

/// A tuning defined by two independent lattice vectors and their frequency
/// ratios, plus a free transposition offset in octaves.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConsistentTuning {
    v1: LatticeVector,
    v2: LatticeVector,
    f1: f32,
    f2: f32,
    log2_f1: f32,
    log2_f2: f32,
    det: i32,
    offset: f32,
}

impl Default for ConsistentTuning {
    fn default() -> Self {
        TuningPreset::Tet12.tuning()
    }
}

impl ConsistentTuning {
    /// Create a tuning assigning ratio `f1` to `v1` and `f2` to `v2`
    pub fn new(v1: LatticeVector, f1: f32, v2: LatticeVector, f2: f32) -> Result<Self> {
        validate(v1, f1, v2, f2)?;
        Ok(Self::from_valid_basis(v1, f1, v2, f2))
    }

    fn from_valid_basis(v1: LatticeVector, f1: f32, v2: LatticeVector, f2: f32) -> Self {
        let det = det(v1, v2);
        debug_assert!(det != 0);
        Self {
            v1,
            v2,
            f1,
            f2,
            log2_f1: f1.log2(),
            log2_f2: f2.log2(),
            det,
            offset: 0.0,
        }
    }

    /// Re-parameterize the tuning in place. The offset is kept.
    ///
    /// On error the tuning is left unchanged.
    pub fn set_params(&mut self, v1: LatticeVector, f1: f32, v2: LatticeVector, f2: f32) -> Result<()> {
        validate(v1, f1, v2, f2)?;
        let offset = self.offset;
        *self = Self::from_valid_basis(v1, f1, v2, f2);
        self.offset = offset;
        debug!("tuning set to {}", self);
        Ok(())
    }

    /// Coordinates of `v` in the basis `v1`, `v2`
    fn coefficients(&self, v: LatticeVector) -> (f32, f32) {
        let d = self.det as f32;
        (det(v, self.v2) as f32 / d, det(self.v1, v) as f32 / d)
    }

    /// Frequency ratio of `v` above the origin, ignoring the offset
    pub fn vec_to_freq_ratio_no_offset(&self, v: LatticeVector) -> f32 {
        let (z1, z2) = self.coefficients(v);
        self.f1.powf(z1) * self.f2.powf(z2)
    }

    /// Frequency ratio of `v`, offset included
    pub fn vec_to_freq_ratio(&self, v: LatticeVector) -> f32 {
        self.vec_to_freq_ratio_no_offset(v) * 2f32.powf(self.offset)
    }

    /// Pitch of `v` in octaves above the origin, i.e. `log2` of its ratio
    pub fn vec_to_voltage_no_offset(&self, v: LatticeVector) -> f32 {
        let (z1, z2) = self.coefficients(v);
        z1 * self.log2_f1 + z2 * self.log2_f2
    }

    /// 1V/oct pitch of `v`, offset included
    pub fn vec_to_voltage(&self, v: LatticeVector) -> f32 {
        self.vec_to_voltage_no_offset(v) + self.offset
    }

    /// Size of `v` in cents, ignoring the offset
    pub fn vec_to_cents(&self, v: LatticeVector) -> f32 {
        1200.0 * self.vec_to_voltage_no_offset(v)
    }

    /// Whether the lattice direction (1,0) is tuned above (0,1)
    pub fn x_axis_is_higher(&self) -> bool {
        self.vec_to_freq_ratio_no_offset(LatticeVector::new(1, 0))
            > self.vec_to_freq_ratio_no_offset(LatticeVector::new(0, 1))
    }

    /// First basis vector
    pub fn v1(&self) -> LatticeVector {
        self.v1
    }

    /// Second basis vector
    pub fn v2(&self) -> LatticeVector {
        self.v2
    }

    /// Ratio of `v1`
    pub fn f1(&self) -> f32 {
        self.f1
    }

    /// Ratio of `v2`
    pub fn f2(&self) -> f32 {
        self.f2
    }

    /// `log2` of `f1`
    pub fn log2_f1(&self) -> f32 {
        self.log2_f1
    }

    /// `log2` of `f2`
    pub fn log2_f2(&self) -> f32 {
        self.log2_f2
    }

    /// Transposition in octaves
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Set the transposition in octaves
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Frequency of the origin in Hz, assuming 0V is middle C
    pub fn offset_as_standard_freq(&self) -> f32 {
        REFERENCE_FREQ * 2f32.powf(self.offset)
    }
}

impl fmt::Display for ConsistentTuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}ct {}={}ct",
            self.v1,
            (1200.0 * self.log2_f1).round() as i32,
            self.v2,
            (1200.0 * self.log2_f2).round() as i32
        )
    }
}

fn validate(v1: LatticeVector, f1: f32, v2: LatticeVector, f2: f32) -> Result<()> {
    if det(v1, v2) == 0 {
        return Err(Error::DegenerateLattice { a: v1, b: v2 });
    }
    for f in [f1, f2] {
        if !(f.is_finite() && f > 0.0) {
            return Err(Error::InvalidRatio(f));
        }
    }
    Ok(())
}

/// Built-in tunings of the diatonic lattice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum TuningPreset {
    /// 12-tone equal temperament
    #[value(name = "12tet")]
    Tet12,
    /// Pure fifths and octaves
    Pythagorean,
    /// Pure major thirds and octaves
    #[value(name = "meantone-quarter")]
    QuarterCommaMeantone,
    /// Pure minor thirds and octaves
    #[value(name = "meantone-third")]
    ThirdCommaMeantone,
    /// Pure major thirds and fifths
    #[value(name = "5limit")]
    FiveLimitCleantone,
    /// Pure septimal minor thirds and fifths
    #[value(name = "7limit")]
    SevenLimitCleantone,
    /// 19-tone equal temperament
    #[value(name = "19tet")]
    Tet19,
    /// 31-tone equal temperament
    #[value(name = "31tet")]
    Tet31,
}

impl TuningPreset {
    /// Every preset, in menu order
    pub const ALL: [TuningPreset; 8] = [
        TuningPreset::Tet12,
        TuningPreset::Pythagorean,
        TuningPreset::QuarterCommaMeantone,
        TuningPreset::ThirdCommaMeantone,
        TuningPreset::FiveLimitCleantone,
        TuningPreset::SevenLimitCleantone,
        TuningPreset::Tet19,
        TuningPreset::Tet31,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            TuningPreset::Tet12 => "12-TET",
            TuningPreset::Pythagorean => "Pythagorean",
            TuningPreset::QuarterCommaMeantone => "1/4-comma Meantone",
            TuningPreset::ThirdCommaMeantone => "1/3-comma Meantone",
            TuningPreset::FiveLimitCleantone => "5-limit (Cleantone)",
            TuningPreset::SevenLimitCleantone => "7-limit (m3=7/6 P5=3/2)",
            TuningPreset::Tet19 => "19-TET",
            TuningPreset::Tet31 => "31-TET",
        }
    }

    fn basis(self) -> (LatticeVector, f32, LatticeVector, f32) {
        let octave = LatticeVector::new(2, 5);
        match self {
            TuningPreset::Tet12 => (octave, 2.0, LatticeVector::new(1, 0), 2f32.powf(1.0 / 12.0)),
            TuningPreset::Pythagorean => (octave, 2.0, LatticeVector::new(1, 3), 3.0 / 2.0),
            TuningPreset::QuarterCommaMeantone => (octave, 2.0, LatticeVector::new(0, 2), 5.0 / 4.0),
            TuningPreset::ThirdCommaMeantone => (octave, 2.0, LatticeVector::new(1, 1), 6.0 / 5.0),
            TuningPreset::FiveLimitCleantone => {
                (LatticeVector::new(0, 2), 5.0 / 4.0, LatticeVector::new(1, 3), 3.0 / 2.0)
            }
            TuningPreset::SevenLimitCleantone => {
                (LatticeVector::new(1, 1), 7.0 / 6.0, LatticeVector::new(1, 3), 3.0 / 2.0)
            }
            TuningPreset::Tet19 => (octave, 2.0, LatticeVector::new(1, 0), 2f32.powf(2.0 / 19.0)),
            TuningPreset::Tet31 => (octave, 2.0, LatticeVector::new(1, 0), 2f32.powf(3.0 / 31.0)),
        }
    }

    /// A fresh tuning for this preset, with zero offset
    pub fn tuning(self) -> ConsistentTuning {
        let (v1, f1, v2, f2) = self.basis();
        ConsistentTuning::from_valid_basis(v1, f1, v2, f2)
    }
}

impl fmt::Display for TuningPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
