//! Keyboard to scale lattice mapping
//!
//! The physical hex grid and the abstract scale lattice are related by an
//! affine map fixed by three keyboard points: a base key, and two keys that
//! play the scale intervals (2,5) and (1,3). Rearranging the layout moves the
//! two interval keys around the base and re-derives the map.

use log::debug;
use serde::Serialize;

use super::error::Result;
use super::lattice::{LatticeMatrix, LatticeVector};

/// Scale interval played by `interval1` (the diatonic octave)
pub const SCALE_INTERVAL1: LatticeVector = LatticeVector::new(2, 5);
/// Scale interval played by `interval2` (the diatonic fifth)
pub const SCALE_INTERVAL2: LatticeVector = LatticeVector::new(1, 3);

/// The three keyboard points defining the mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Anchors {
    /// Keyboard coordinate of the scale origin
    pub base: LatticeVector,
    /// Keyboard coordinate of [`SCALE_INTERVAL1`]
    pub interval1: LatticeVector,
    /// Keyboard coordinate of [`SCALE_INTERVAL2`]
    pub interval2: LatticeVector,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            base: LatticeVector::new(5, 5),
            interval1: LatticeVector::new(8, 7),
            interval2: LatticeVector::new(7, 6),
        }
    }
}

impl Anchors {
    fn transform_about_base(&mut self, m: LatticeMatrix) {
        self.interval1 = self.base + m * (self.interval1 - self.base);
        self.interval2 = self.base + m * (self.interval2 - self.base);
    }

    fn translate(&mut self, delta: LatticeVector) {
        self.base += delta;
        self.interval1 += delta;
        self.interval2 += delta;
    }
}

/// Symmetries of the hex grid, in keyboard coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Isometries {
    rot_plus_60: LatticeMatrix,
    rot_minus_60: LatticeMatrix,
    horizontal_flip: LatticeMatrix,
    vertical_flip: LatticeMatrix,
}

impl Isometries {
    fn derive() -> Result<Self> {
        let v = LatticeVector::new;
        Ok(Self {
            rot_plus_60: LatticeMatrix::find_transform(v(1, 1), v(1, 0), v(0, 1), v(1, 1))?,
            rot_minus_60: LatticeMatrix::find_transform(v(1, 0), v(1, 1), v(1, 1), v(0, 1))?,
            horizontal_flip: LatticeMatrix::find_transform(v(0, 1), v(0, -1), v(2, 1), v(2, 1))?,
            vertical_flip: LatticeMatrix::find_transform(v(0, 1), v(0, 1), v(2, 1), v(-2, -1))?,
        })
    }
}

/// Affine map between keyboard coordinates and scale coordinates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardLatticeMapper {
    anchors: Anchors,
    transform_e2s: LatticeMatrix,
    transform_s2e: LatticeMatrix,
    isometries: Isometries,
}

impl KeyboardLatticeMapper {
    /// Create a mapper from its three defining keyboard points
    pub fn new(base: LatticeVector, interval1: LatticeVector, interval2: LatticeVector) -> Result<Self> {
        let mut mapper = Self {
            anchors: Anchors {
                base,
                interval1,
                interval2,
            },
            transform_e2s: LatticeMatrix::IDENTITY,
            transform_s2e: LatticeMatrix::IDENTITY,
            isometries: Isometries::derive()?,
        };
        mapper.calc_transforms()?;
        Ok(mapper)
    }

    /// The stock layout: base (5,5), octave at (8,7), fifth at (7,6)
    pub fn with_default_layout() -> Result<Self> {
        let anchors = Anchors::default();
        Self::new(anchors.base, anchors.interval1, anchors.interval2)
    }

    /// Recompute both transforms from the current anchors
    pub fn calc_transforms(&mut self) -> Result<()> {
        let r1 = self.anchors.interval1 - self.anchors.base;
        let r2 = self.anchors.interval2 - self.anchors.base;
        let e2s = LatticeMatrix::find_transform(r1, SCALE_INTERVAL1, r2, SCALE_INTERVAL2)?;
        let s2e = LatticeMatrix::find_transform(SCALE_INTERVAL1, r1, SCALE_INTERVAL2, r2)?;
        self.transform_e2s = e2s;
        self.transform_s2e = s2e;
        debug!(
            "mapper anchors {:?}: e2s={:?} s2e={:?}",
            self.anchors, self.transform_e2s, self.transform_s2e
        );
        Ok(())
    }

    /// The current anchor points
    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Keyboard coordinate of the scale origin
    pub fn base(&self) -> LatticeVector {
        self.anchors.base
    }

    /// Keyboard displacement to scale interval
    pub fn exquis_to_scale(&self, c: LatticeVector) -> LatticeVector {
        self.transform_e2s * c
    }

    /// Scale interval to keyboard displacement
    pub fn scale_to_exquis(&self, c: LatticeVector) -> LatticeVector {
        self.transform_s2e * c
    }

    /// Scale coordinate of the key at `key`
    pub fn key_to_scale(&self, key: LatticeVector) -> LatticeVector {
        self.exquis_to_scale(key - self.anchors.base)
    }

    /// Keyboard position playing scale coordinate `c`
    pub fn scale_to_key(&self, c: LatticeVector) -> LatticeVector {
        self.anchors.base + self.scale_to_exquis(c)
    }

    /// Apply `f` to the anchors and re-derive the transforms, rolling back on error
    fn update(&mut self, f: impl FnOnce(&mut Anchors, &Isometries)) -> Result<()> {
        let previous = self.anchors;
        let isometries = self.isometries;
        f(&mut self.anchors, &isometries);
        if let Err(e) = self.calc_transforms() {
            self.anchors = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Move the base key, carrying both interval keys along
    pub fn move_base_to(&mut self, new_base: LatticeVector) -> Result<()> {
        self.update(|a, _| {
            let delta = new_base - a.base;
            a.translate(delta);
        })
    }

    /// Move the layout `amount` keys along the keyboard x axis
    pub fn shift_x(&mut self, amount: i32) -> Result<()> {
        self.update(|a, _| a.translate(LatticeVector::new(amount, 0)))
    }

    /// Move the layout `amount` keys along the keyboard y axis
    pub fn shift_y(&mut self, amount: i32) -> Result<()> {
        self.update(|a, _| a.translate(LatticeVector::new(0, amount)))
    }

    /// Shear along x, proportional to each interval key's y distance from the base
    pub fn skew_x(&mut self, amount: i32) -> Result<()> {
        self.update(|a, _| {
            a.interval1.x += amount * (a.interval1.y - a.base.y);
            a.interval2.x += amount * (a.interval2.y - a.base.y);
        })
    }

    /// Shear along y, proportional to each interval key's x distance from the base
    pub fn skew_y(&mut self, amount: i32) -> Result<()> {
        self.update(|a, _| {
            a.interval1.y += amount * (a.interval1.x - a.base.x);
            a.interval2.y += amount * (a.interval2.x - a.base.x);
        })
    }

    /// Rotate the layout by +60 degrees about the base
    pub fn rotate_plus_60(&mut self) -> Result<()> {
        self.update(|a, iso| a.transform_about_base(iso.rot_plus_60))
    }

    /// Rotate the layout by -60 degrees about the base
    pub fn rotate_minus_60(&mut self) -> Result<()> {
        self.update(|a, iso| a.transform_about_base(iso.rot_minus_60))
    }

    /// Mirror the layout horizontally about the base
    pub fn flip_horizontally(&mut self) -> Result<()> {
        self.update(|a, iso| a.transform_about_base(iso.horizontal_flip))
    }

    /// Mirror the layout vertically about the base
    pub fn flip_vertically(&mut self) -> Result<()> {
        self.update(|a, iso| a.transform_about_base(iso.vertical_flip))
    }
}
