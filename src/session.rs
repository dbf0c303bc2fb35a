//! Interactive tuning session
//!
//! Holds the state the keyboard edits: the tuning, the scale and the key
//! mapping, plus which control mode is active and which intervals are
//! selected for retuning. Controller gestures translate into the methods
//! here; the session never talks MIDI itself.

use log::debug;
use serde::Serialize;

use crate::datalink::TuningSnapshot;
use crate::grid::lattice::{det, posfmod, ZERO_VECTOR};
use crate::grid::rational::{closest_rational, ratio_label};
use crate::grid::{ConsistentTuning, KeyboardLatticeMapper, LatticeVector, RegularScale, Result, TuningPreset};
use crate::keyboard;
use crate::voct::{self, BlackKeyMap};

/// Keyboard coordinate of the scale system picker's origin
pub const SCALE_PICKER_ORIGIN: LatticeVector = LatticeVector::new(0, 2);

/// What a key press does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Keys play notes
    #[default]
    Play,
    /// Keys pick the intervals to retune
    IntervalSelect,
    /// Keys move the layout's base key
    Arrange,
    /// Keys pick the scale system
    ScaleSelect,
}

/// Intervals picked for retuning
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RetuneSelection {
    /// Nothing to retune
    #[default]
    Inactive,
    /// Retune `interval`; `(0,0)` retunes the offset
    Retune {
        /// Interval to retune
        interval: LatticeVector,
    },
    /// Retune `interval` while `constant` keeps its ratio
    RetuneAgainst {
        /// Interval to retune
        interval: LatticeVector,
        /// Interval held fixed
        constant: LatticeVector,
    },
}

impl RetuneSelection {
    /// The interval being retuned
    pub fn interval(&self) -> Option<LatticeVector> {
        match *self {
            RetuneSelection::Inactive => None,
            RetuneSelection::Retune { interval } | RetuneSelection::RetuneAgainst { interval, .. } => Some(interval),
        }
    }

    /// The interval held fixed, if one was picked
    pub fn constant(&self) -> Option<LatticeVector> {
        match *self {
            RetuneSelection::RetuneAgainst { constant, .. } => Some(constant),
            _ => None,
        }
    }
}

/// Layout edits available in arrange mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrangeOp {
    /// Rotate by +60 degrees
    RotatePlus60,
    /// Rotate by -60 degrees
    RotateMinus60,
    /// Mirror horizontally
    FlipHorizontally,
    /// Mirror vertically
    FlipVertically,
    /// Shear along the x axis
    SkewX(i32),
    /// Shear along the y axis
    SkewY(i32),
    /// Translate along the x axis
    ShiftX(i32),
    /// Translate along the y axis
    ShiftY(i32),
}

/// What a key plays under the current session state
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteInfo {
    /// Key id
    pub key_id: u8,
    /// Keyboard coordinate
    pub key: LatticeVector,
    /// Scale lattice coordinate
    pub coord: LatticeVector,
    /// Scale degree, `None` outside the scale
    pub seq_nr: Option<i32>,
    /// Canonical name
    pub name: String,
    /// Size above the origin in cents
    pub cents: f32,
    /// Cents above the period boundary below
    pub period_cents: f32,
    /// Closest just ratio label
    pub ratio: String,
    /// 1V/oct output
    pub voltage: f32,
}

/// Tuning, scale and layout edited from the keyboard
#[derive(Clone, Debug)]
pub struct TuningSession {
    tuning: ConsistentTuning,
    scale: RegularScale,
    mapper: KeyboardLatticeMapper,
    mode: Mode,
    selection: RetuneSelection,
    preset: TuningPreset,
    manual_retune: bool,
    black_key_map: BlackKeyMap,
}

impl TuningSession {
    /// 12-TET, C major, stock layout
    pub fn new() -> Result<Self> {
        Self::with_preset(TuningPreset::Tet12)
    }

    /// Start from `preset` with the stock layout
    pub fn with_preset(preset: TuningPreset) -> Result<Self> {
        Ok(Self {
            tuning: preset.tuning(),
            scale: RegularScale::default(),
            mapper: KeyboardLatticeMapper::with_default_layout()?,
            mode: Mode::Play,
            selection: RetuneSelection::Inactive,
            preset,
            manual_retune: false,
            black_key_map: BlackKeyMap::default(),
        })
    }

    /// Current tuning
    pub fn tuning(&self) -> &ConsistentTuning {
        &self.tuning
    }

    /// Current scale
    pub fn scale(&self) -> &RegularScale {
        &self.scale
    }

    /// Key layout
    pub fn mapper(&self) -> &KeyboardLatticeMapper {
        &self.mapper
    }

    /// Active control mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current retune selection
    pub fn selection(&self) -> RetuneSelection {
        self.selection
    }

    /// Whether the tuning was edited by hand since the last preset
    pub fn did_manual_retune(&self) -> bool {
        self.manual_retune
    }

    /// Preset name, or the tuning's basis once it has been edited
    pub fn tuning_info(&self) -> String {
        if self.manual_retune {
            self.tuning.to_string()
        } else {
            self.preset.name().to_string()
        }
    }

    /// Switch to a preset tuning, keeping the offset
    pub fn apply_preset(&mut self, preset: TuningPreset) -> Result<()> {
        let t = preset.tuning();
        self.tuning.set_params(t.v1(), t.f1(), t.v2(), t.f2())?;
        self.preset = preset;
        self.manual_retune = false;
        Ok(())
    }

    /// Change control mode.
    ///
    /// Leaving interval selection with a single interval picked (other than
    /// the offset or the period) holds the period constant. Entering any mode
    /// other than play drops the selection.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        if self.mode == Mode::IntervalSelect {
            if let RetuneSelection::Retune { interval } = self.selection {
                let system = self.scale.scale_system();
                if interval != ZERO_VECTOR && interval != system {
                    self.selection = RetuneSelection::RetuneAgainst {
                        interval,
                        constant: system,
                    };
                }
            }
        }
        if mode != Mode::Play {
            self.selection = RetuneSelection::Inactive;
        }
        debug!("mode {:?} -> {:?}, selection {:?}", self.mode, mode, self.selection);
        self.mode = mode;
    }

    /// Pick `c` as retune or constant interval. Returns `false` if ignored.
    ///
    /// Apart from `(0,0)`, only scale degrees within the first period box
    /// `[0,a] x [0,b]` can be picked. A second pick becomes the constant
    /// interval if it is independent of the first.
    pub fn select_interval(&mut self, c: LatticeVector) -> bool {
        if c == ZERO_VECTOR {
            self.selection = RetuneSelection::Retune { interval: c };
            return true;
        }
        let system = self.scale.scale_system();
        let in_box = c.x >= 0 && c.y >= 0 && c.x <= system.x && c.y <= system.y;
        if !in_box || self.scale.coord_to_scale_note_seq_nr(c).is_none() {
            return false;
        }
        self.selection = match self.selection {
            RetuneSelection::Retune { interval } if interval != ZERO_VECTOR => {
                if det(interval, c) == 0 {
                    return false;
                }
                RetuneSelection::RetuneAgainst { interval, constant: c }
            }
            _ => RetuneSelection::Retune { interval: c },
        };
        true
    }

    fn ratio(&self, v: LatticeVector) -> f32 {
        self.tuning.vec_to_freq_ratio_no_offset(v)
    }

    /// Retune the selected interval by `cents`.
    ///
    /// `(0,0)` moves the offset. The period alone stretches the whole tuning
    /// proportionally. Anything else is retuned against the constant
    /// interval, the period by default.
    pub fn retune_interval_by_amount(&mut self, cents: f32) -> Result<()> {
        let Some(interval) = self.selection.interval() else {
            return Ok(());
        };
        let constant = self.selection.constant();
        let system = self.scale.scale_system();
        let amount = cents / 1200.0;

        if interval == ZERO_VECTOR {
            self.tuning.set_offset(self.tuning.offset() + amount);
        } else if interval == system && constant.is_none() {
            let log_f1 = self.tuning.vec_to_voltage_no_offset(system);
            let (other, log_f2) = if self.tuning.v1() == system {
                (self.tuning.v2(), self.tuning.log2_f2())
            } else {
                (self.tuning.v1(), self.tuning.log2_f1())
            };
            let new_log_f1 = log_f1 + amount;
            let new_log_f2 = log_f2 + log_f2 / log_f1 * amount;
            self.tuning
                .set_params(system, 2f32.powf(new_log_f1), other, 2f32.powf(new_log_f2))?;
        } else {
            let constant = constant.unwrap_or(system);
            let retune_f = self.ratio(interval) * 2f32.powf(amount);
            let constant_f = self.ratio(constant);
            self.tuning.set_params(interval, retune_f, constant, constant_f)?;
        }
        self.manual_retune = true;
        Ok(())
    }

    /// Snap the selected interval to a nearby just ratio
    pub fn justify_tuning(&mut self) -> Result<()> {
        let Some(interval) = self.selection.interval().filter(|&i| i != ZERO_VECTOR) else {
            return Ok(());
        };
        let approx = closest_rational(self.ratio(interval) as f64, 5.0 * self.scale.n() as f64);
        debug!("justifying {} to {}", interval, approx);
        self.reanchor(interval, approx.to_f32())
    }

    /// Make the selected interval a tuning basis vector at its current ratio
    pub fn set_tuning(&mut self) -> Result<()> {
        let Some(interval) = self.selection.interval().filter(|&i| i != ZERO_VECTOR) else {
            return Ok(());
        };
        self.reanchor(interval, self.ratio(interval))
    }

    /// Give `interval` ratio `f`, holding the constant interval (or a basis
    /// vector independent of `interval`) fixed
    fn reanchor(&mut self, interval: LatticeVector, f: f32) -> Result<()> {
        let (other, other_f) = match self.selection.constant() {
            Some(constant) => (constant, self.ratio(constant)),
            None if det(interval, self.tuning.v1()) != 0 => (self.tuning.v1(), self.tuning.f1()),
            None => (self.tuning.v2(), self.tuning.f2()),
        };
        self.tuning.set_params(interval, f, other, other_f)?;
        self.manual_retune = true;
        Ok(())
    }

    /// Transpose up one period
    pub fn octave_up(&mut self) {
        let period = self.ratio(self.scale.scale_system()).log2();
        self.tuning.set_offset(self.tuning.offset() + period);
    }

    /// Transpose down one period
    pub fn octave_down(&mut self) {
        let period = self.ratio(self.scale.scale_system()).log2();
        self.tuning.set_offset(self.tuning.offset() - period);
    }

    /// Set the scale mode, clamped to the scale size
    pub fn set_scale_mode(&mut self, mode: i32) {
        self.scale.set_mode(mode);
    }

    /// Next mode up
    pub fn mode_up(&mut self) {
        self.scale.set_mode(self.scale.mode() + 1);
    }

    /// Next mode down
    pub fn mode_down(&mut self) {
        self.scale.set_mode(self.scale.mode() - 1);
    }

    /// Apply a layout edit
    pub fn arrange(&mut self, op: ArrangeOp) -> Result<()> {
        match op {
            ArrangeOp::RotatePlus60 => self.mapper.rotate_plus_60(),
            ArrangeOp::RotateMinus60 => self.mapper.rotate_minus_60(),
            ArrangeOp::FlipHorizontally => self.mapper.flip_horizontally(),
            ArrangeOp::FlipVertically => self.mapper.flip_vertically(),
            ArrangeOp::SkewX(amount) => self.mapper.skew_x(amount),
            ArrangeOp::SkewY(amount) => self.mapper.skew_y(amount),
            ArrangeOp::ShiftX(amount) => self.mapper.shift_x(amount),
            ArrangeOp::ShiftY(amount) => self.mapper.shift_y(amount),
        }
    }

    /// Change the scale system; the previous one stays on error
    pub fn select_scale_system(&mut self, v: LatticeVector) -> Result<()> {
        self.scale.set_scale_system(v)?;
        debug!("scale system {} ({} notes), mode {}", v, self.scale.n(), self.scale.mode());
        Ok(())
    }

    /// Handle a key press in the current mode and report what the key plays.
    ///
    /// Returns `Ok(None)` for an id that is not on the keyboard.
    pub fn press_key(&mut self, id: u8) -> Result<Option<NoteInfo>> {
        if id >= keyboard::KEY_COUNT {
            return Ok(None);
        }
        let key = keyboard::key_id_to_coord(id);
        match self.mode {
            Mode::Play => {}
            Mode::IntervalSelect => {
                self.select_interval(self.mapper.key_to_scale(key));
            }
            Mode::Arrange => self.mapper.move_base_to(key)?,
            Mode::ScaleSelect => {
                let system = (key - SCALE_PICKER_ORIGIN).swapped();
                if system.x > 0 && system.y > 0 && RegularScale::is_coprime_scale_vector(system) {
                    self.select_scale_system(system)?;
                }
            }
        }
        Ok(self.note_info(id))
    }

    /// Scale coordinate played by key `id`
    pub fn key_scale_coord(&self, id: u8) -> Option<LatticeVector> {
        (id < keyboard::KEY_COUNT).then(|| self.mapper.key_to_scale(keyboard::key_id_to_coord(id)))
    }

    /// What key `id` plays
    pub fn note_info(&self, id: u8) -> Option<NoteInfo> {
        let coord = self.key_scale_coord(id)?;
        Some(NoteInfo {
            key_id: id,
            key: keyboard::key_id_to_coord(id),
            coord,
            seq_nr: self.scale.coord_to_scale_note_seq_nr(coord),
            name: self.scale.canonical_name_for_coord(coord, &self.tuning),
            cents: self.tuning.vec_to_cents(coord),
            period_cents: posfmod(
                self.tuning.vec_to_cents(coord),
                self.tuning.vec_to_cents(self.scale.scale_system()),
            ),
            ratio: ratio_label(self.ratio(coord), 5.0 * self.scale.n() as f64),
            voltage: self.tuning.vec_to_voltage(coord),
        })
    }

    /// 1V/oct output for a key
    pub fn key_voltage(&self, id: u8) -> Option<f32> {
        self.key_scale_coord(id).map(|c| self.tuning.vec_to_voltage(c))
    }

    /// Retuned voltage for a 12-TET input voltage, via the key it would play
    pub fn voltage_for_input(&self, voltage: f32) -> Option<f32> {
        keyboard::key_for_voltage(voltage).and_then(|id| self.key_voltage(id))
    }

    /// Spelling used by [`Self::mapped_voltage`]
    pub fn black_key_map(&self) -> BlackKeyMap {
        self.black_key_map
    }

    /// Set the black-key spelling
    pub fn set_black_key_map(&mut self, map: BlackKeyMap) {
        self.black_key_map = map;
    }

    /// Retuned voltage for any 12-TET input voltage, without going through
    /// the keyboard
    pub fn mapped_voltage(&self, voltage: f32) -> f32 {
        voct::map_voltage(&self.tuning, voltage, self.black_key_map)
    }

    /// The state to send over the data link
    pub fn snapshot(&self) -> TuningSnapshot {
        TuningSnapshot::from_state(&self.tuning, &self.scale)
    }

    /// Load a received snapshot; nothing changes on error
    pub fn apply_snapshot(&mut self, snapshot: &TuningSnapshot) -> Result<()> {
        snapshot.apply_to(&mut self.tuning, &mut self.scale)?;
        self.manual_retune = true;
        Ok(())
    }
}
