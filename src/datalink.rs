//! Sample-rate data link
//!
//! Carries a fixed list of 32-bit values over a single channel that moves one
//! `f32` per tick. Each frame is `START, value[0] .. value[n-1], END`. Both
//! ends keep two buffers (red and blue): one is live while the other is being
//! written, and they swap only at the end sentinel, so a reader never sees a
//! frame mixing two generations.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::grid::{ConsistentTuning, LatticeVector, RegularScale, Result};

/// Frame start marker, the bytes `54 44 41 06`
pub const START_SENTINEL: u32 = u32::from_le_bytes([0x54, 0x44, 0x41, 0x06]);
/// Frame end marker, the bytes `54 44 41 0D`
pub const END_SENTINEL: u32 = u32::from_le_bytes([0x54, 0x44, 0x41, 0x0D]);

/// Values in a tuning frame
pub const TUNING_VALUE_COUNT: usize = 9;
/// Ticks per tuning frame, sentinels included
pub const TUNING_FRAME_LEN: usize = TUNING_VALUE_COUNT + 2;

/// One value slot, sent as its 4-byte bit pattern
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    /// A float value
    Float(f32),
    /// An integer value
    Int(i32),
}

impl Payload {
    /// The 4-byte pattern put on the wire
    pub fn to_bits(self) -> u32 {
        match self {
            Payload::Float(f) => f.to_bits(),
            Payload::Int(i) => i as u32,
        }
    }

    /// The channel sample carrying this value
    pub fn to_sample(self) -> f32 {
        f32::from_bits(self.to_bits())
    }
}

#[derive(Clone, Debug)]
struct BufferPair {
    red: Vec<u32>,
    blue: Vec<u32>,
    processing_red: bool,
}

impl BufferPair {
    fn new() -> Self {
        Self {
            red: Vec::new(),
            blue: Vec::new(),
            processing_red: true,
        }
    }

    fn len(&self) -> usize {
        self.red.len()
    }

    fn push(&mut self, word: u32) {
        self.red.push(word);
        self.blue.push(word);
    }

    /// Buffer selected by `processing_red`, and the other one
    fn split(&mut self) -> (&mut Vec<u32>, &mut Vec<u32>) {
        if self.processing_red {
            (&mut self.red, &mut self.blue)
        } else {
            (&mut self.blue, &mut self.red)
        }
    }

    fn selected(&self) -> &[u32] {
        if self.processing_red {
            &self.red
        } else {
            &self.blue
        }
    }

    fn other(&self) -> &[u32] {
        if self.processing_red {
            &self.blue
        } else {
            &self.red
        }
    }

    fn flip(&mut self) {
        self.processing_red = !self.processing_red;
    }
}

/// Sending end: turns the current values into one sample per tick
#[derive(Clone, Debug)]
pub struct DataSender {
    buffers: BufferPair,
    state: usize,
}

impl Default for DataSender {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSender {
    /// A sender with no value slots
    pub fn new() -> Self {
        Self {
            buffers: BufferPair::new(),
            state: 0,
        }
    }

    /// Append a slot, initialized in both buffers
    pub fn push_value(&mut self, value: Payload) {
        self.buffers.push(value.to_bits());
    }

    /// Stage a new value for slot `index`; it goes out from the next frame on.
    ///
    /// Returns `false` if there is no such slot.
    pub fn set_value(&mut self, index: usize, value: Payload) -> bool {
        let (_, staging) = self.buffers.split();
        match staging.get_mut(index) {
            Some(slot) => {
                *slot = value.to_bits();
                true
            }
            None => false,
        }
    }

    /// Number of value slots per frame
    pub fn value_count(&self) -> usize {
        self.buffers.len()
    }

    /// Position in the frame: 0 is the start sentinel, `n + 1` the end sentinel
    pub fn state(&self) -> usize {
        self.state
    }

    /// Emit the next sample of the stream
    pub fn tick(&mut self) -> f32 {
        let n = self.buffers.len();
        let word = match self.state {
            0 => {
                self.state = 1;
                START_SENTINEL
            }
            s if s <= n => {
                self.state += 1;
                self.buffers.selected()[s - 1]
            }
            _ => {
                self.state = 0;
                self.buffers.flip();
                // staging starts from what just went live
                let (live, staging) = self.buffers.split();
                staging.copy_from_slice(live);
                trace!("sender frame boundary, processing_red={}", self.buffers.processing_red);
                END_SENTINEL
            }
        };
        f32::from_bits(word)
    }
}

/// Receiving end: reassembles frames from one sample per tick
#[derive(Clone, Debug)]
pub struct DataReceiver {
    buffers: BufferPair,
    state: usize,
    frames_received: u64,
}

impl DataReceiver {
    /// A receiver expecting `n` values per frame, all reading zero until the
    /// first frame completes
    pub fn with_values(n: usize) -> Self {
        let mut buffers = BufferPair::new();
        for _ in 0..n {
            buffers.push(0);
        }
        Self {
            buffers,
            state: 0,
            frames_received: 0,
        }
    }

    /// Number of value slots per frame
    pub fn value_count(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the receiver is waiting for a start sentinel
    pub fn is_hunting(&self) -> bool {
        self.state == 0
    }

    /// Frames completed since creation
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// Whether at least one frame has completed
    pub fn has_frame(&self) -> bool {
        self.frames_received > 0
    }

    /// Consume one channel sample. Returns `true` when it completed a frame.
    pub fn tick(&mut self, sample: f32) -> bool {
        let word = sample.to_bits();
        let n = self.buffers.len();
        match self.state {
            0 => {
                if word == START_SENTINEL {
                    self.state = 1;
                }
            }
            s if s <= n => {
                let (filling, _) = self.buffers.split();
                filling[s - 1] = word;
                self.state += 1;
            }
            _ => {
                if word == END_SENTINEL {
                    self.buffers.flip();
                    self.frames_received += 1;
                    self.state = 0;
                    trace!("receiver committed frame {}", self.frames_received);
                    return true;
                }
                debug!("data link lost sync: expected end sentinel, got {:#010x}", word);
                self.state = if word == START_SENTINEL { 1 } else { 0 };
            }
        }
        false
    }

    /// Raw words of the last complete frame
    pub fn words(&self) -> &[u32] {
        self.buffers.other()
    }

    /// Slot `index` of the last frame read as a float
    pub fn get_float(&self, index: usize) -> Option<f32> {
        self.words().get(index).map(|&w| f32::from_bits(w))
    }

    /// Slot `index` of the last frame read as an integer
    pub fn get_int(&self, index: usize) -> Option<i32> {
        self.words().get(index).map(|&w| w as i32)
    }
}

/// The tuning and scale state carried by one frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningSnapshot {
    /// First tuning basis vector
    pub v1: LatticeVector,
    /// Ratio of `v1`
    pub f1: f32,
    /// Second tuning basis vector
    pub v2: LatticeVector,
    /// Ratio of `v2`
    pub f2: f32,
    /// Scale system of the regular scale
    pub scale_system: LatticeVector,
    /// Scale mode
    pub mode: i32,
}

impl TuningSnapshot {
    /// Capture the current tuning and scale
    pub fn from_state(tuning: &ConsistentTuning, scale: &RegularScale) -> Self {
        Self {
            v1: tuning.v1(),
            f1: tuning.f1(),
            v2: tuning.v2(),
            f2: tuning.f2(),
            scale_system: scale.scale_system(),
            mode: scale.mode(),
        }
    }

    /// Wire order: `v1.x, v1.y, f1, v2.x, v2.y, f2, system.x, system.y, mode`
    pub fn to_payloads(&self) -> [Payload; TUNING_VALUE_COUNT] {
        [
            Payload::Int(self.v1.x),
            Payload::Int(self.v1.y),
            Payload::Float(self.f1),
            Payload::Int(self.v2.x),
            Payload::Int(self.v2.y),
            Payload::Float(self.f2),
            Payload::Int(self.scale_system.x),
            Payload::Int(self.scale_system.y),
            Payload::Int(self.mode),
        ]
    }

    /// Decode a frame's words; `None` unless there are exactly nine
    pub fn from_words(words: &[u32]) -> Option<Self> {
        let w: &[u32; TUNING_VALUE_COUNT] = words.try_into().ok()?;
        let int = |i: usize| w[i] as i32;
        Some(Self {
            v1: LatticeVector::new(int(0), int(1)),
            f1: f32::from_bits(w[2]),
            v2: LatticeVector::new(int(3), int(4)),
            f2: f32::from_bits(w[5]),
            scale_system: LatticeVector::new(int(6), int(7)),
            mode: int(8),
        })
    }

    /// Load the snapshot into a tuning and scale.
    ///
    /// Both are validated before either is changed; on error neither is
    /// touched. The tuning offset is kept.
    pub fn apply_to(&self, tuning: &mut ConsistentTuning, scale: &mut RegularScale) -> Result<()> {
        let mut next_scale = scale.clone();
        next_scale.set_scale_system(self.scale_system)?;
        next_scale.set_mode(self.mode);
        tuning.set_params(self.v1, self.f1, self.v2, self.f2)?;
        *scale = next_scale;
        Ok(())
    }
}

/// Sender for the tuning frame
#[derive(Clone, Debug)]
pub struct TuningDataSender {
    sender: DataSender,
}

impl TuningDataSender {
    /// A sender whose first frame carries `tuning` and `scale`
    pub fn new(tuning: &ConsistentTuning, scale: &RegularScale) -> Self {
        let mut sender = DataSender::new();
        for payload in TuningSnapshot::from_state(tuning, scale).to_payloads() {
            sender.push_value(payload);
        }
        Self { sender }
    }

    /// Stage the current state for the next frame
    pub fn set_tuning_data(&mut self, tuning: &ConsistentTuning, scale: &RegularScale) {
        self.set_snapshot(&TuningSnapshot::from_state(tuning, scale));
    }

    /// Stage a snapshot for the next frame
    pub fn set_snapshot(&mut self, snapshot: &TuningSnapshot) {
        for (index, payload) in snapshot.to_payloads().into_iter().enumerate() {
            self.sender.set_value(index, payload);
        }
    }

    /// Emit the next sample of the stream
    pub fn tick(&mut self) -> f32 {
        self.sender.tick()
    }
}

/// Receiver for the tuning frame
#[derive(Clone, Debug)]
pub struct TuningDataReceiver {
    receiver: DataReceiver,
}

impl Default for TuningDataReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl TuningDataReceiver {
    /// A receiver hunting for its first frame
    pub fn new() -> Self {
        Self {
            receiver: DataReceiver::with_values(TUNING_VALUE_COUNT),
        }
    }

    /// Consume one channel sample. Returns `true` when it completed a frame.
    pub fn tick(&mut self, sample: f32) -> bool {
        self.receiver.tick(sample)
    }

    /// Frames completed since creation
    pub fn frames_received(&self) -> u64 {
        self.receiver.frames_received()
    }

    /// The last complete snapshot, `None` before the first frame
    pub fn snapshot(&self) -> Option<TuningSnapshot> {
        if !self.receiver.has_frame() {
            return None;
        }
        TuningSnapshot::from_words(self.receiver.words())
    }

    /// Apply the last complete snapshot. Returns `Ok(false)` if none arrived yet.
    pub fn apply_to(&self, tuning: &mut ConsistentTuning, scale: &mut RegularScale) -> Result<bool> {
        match self.snapshot() {
            Some(snapshot) => {
                snapshot.apply_to(tuning, scale)?;
                debug!("applied received tuning {}", tuning);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Error, TuningPreset};

    fn words(samples: &[f32]) -> Vec<u32> {
        samples.iter().map(|s| s.to_bits()).collect()
    }

    #[test]
    fn test_sentinel_bits() {
        assert_eq!(START_SENTINEL, 0x0641_4454);
        assert_eq!(END_SENTINEL, 0x0D41_4454);
        assert_eq!(Payload::Int(-1).to_bits(), u32::MAX);
        assert_eq!(Payload::Float(1.0).to_bits(), 0x3F80_0000);
    }

    #[test]
    fn test_sender_frame_layout() {
        let mut sender = DataSender::new();
        sender.push_value(Payload::Int(1));
        sender.push_value(Payload::Float(2.5));

        let frame: Vec<f32> = (0..4).map(|_| sender.tick()).collect();
        assert_eq!(words(&frame), vec![START_SENTINEL, 1, 2.5f32.to_bits(), END_SENTINEL]);
        assert_eq!(sender.state(), 0);
    }

    #[test]
    fn test_staged_values_wait_for_next_frame() {
        let mut sender = DataSender::new();
        sender.push_value(Payload::Int(1));
        sender.push_value(Payload::Float(2.5));

        sender.tick();
        assert!(sender.set_value(0, Payload::Int(7)));
        assert!(!sender.set_value(2, Payload::Int(7)));
        let rest: Vec<f32> = (0..3).map(|_| sender.tick()).collect();
        assert_eq!(words(&rest), vec![1, 2.5f32.to_bits(), END_SENTINEL]);

        // a partial update builds on the frame that just went live
        sender.set_value(1, Payload::Float(3.0));
        let second: Vec<f32> = (0..4).map(|_| sender.tick()).collect();
        assert_eq!(words(&second), vec![START_SENTINEL, 7, 2.5f32.to_bits(), END_SENTINEL]);
        let third: Vec<f32> = (0..4).map(|_| sender.tick()).collect();
        assert_eq!(words(&third), vec![START_SENTINEL, 7, 3.0f32.to_bits(), END_SENTINEL]);
    }

    #[test]
    fn test_receiver_reads_zero_until_first_frame() {
        let mut receiver = DataReceiver::with_values(2);
        assert_eq!(receiver.get_int(0), Some(0));
        assert_eq!(receiver.get_int(2), None);

        let stream = [START_SENTINEL, 5, 9, END_SENTINEL];
        let committed: Vec<bool> = stream.iter().map(|&w| receiver.tick(f32::from_bits(w))).collect();
        assert_eq!(committed, vec![false, false, false, true]);
        assert_eq!(receiver.get_int(0), Some(5));
        assert_eq!(receiver.get_int(1), Some(9));
    }

    #[test]
    fn test_mixed_payloads_cross_the_link() {
        let mut sender = DataSender::new();
        for value in [Payload::Float(-0.375), Payload::Int(-3), Payload::Float(f32::MAX)] {
            sender.push_value(value);
        }
        let mut receiver = DataReceiver::with_values(3);
        assert_eq!(sender.value_count(), 3);
        assert_eq!(receiver.value_count(), sender.value_count());

        for _ in 0..sender.value_count() + 2 {
            receiver.tick(sender.tick());
        }
        assert_eq!(receiver.get_float(0), Some(-0.375));
        assert_eq!(receiver.get_int(1), Some(-3));
        assert_eq!(receiver.get_float(2), Some(f32::MAX));
        assert_eq!(receiver.get_float(3), None);
    }

    #[test]
    fn test_receiver_relocks_on_start_in_end_slot() {
        let mut receiver = DataReceiver::with_values(2);
        let stream = [START_SENTINEL, 5, 9, START_SENTINEL, 6, 8, END_SENTINEL];
        for w in stream {
            receiver.tick(f32::from_bits(w));
        }
        assert_eq!(receiver.frames_received(), 1);
        assert_eq!(receiver.get_int(0), Some(6));
        assert_eq!(receiver.get_int(1), Some(8));
    }

    #[test]
    fn test_receiver_drops_frame_without_end() {
        let mut receiver = DataReceiver::with_values(2);
        for w in [START_SENTINEL, 5, 9, 42] {
            receiver.tick(f32::from_bits(w));
        }
        assert!(receiver.is_hunting());
        assert!(!receiver.has_frame());
        assert_eq!(receiver.get_int(0), Some(0));
    }

    #[test]
    fn test_snapshot_wire_order() {
        let tuning = TuningPreset::Pythagorean.tuning();
        let scale = RegularScale::default();
        let snapshot = TuningSnapshot::from_state(&tuning, &scale);
        let bits: Vec<u32> = snapshot.to_payloads().iter().map(|p| p.to_bits()).collect();
        assert_eq!(
            bits,
            vec![2, 5, 2.0f32.to_bits(), 1, 3, 1.5f32.to_bits(), 2, 5, 1]
        );
        assert_eq!(TuningSnapshot::from_words(&bits), Some(snapshot));
        assert_eq!(TuningSnapshot::from_words(&bits[..8]), None);
    }

    #[test]
    fn test_zeroed_snapshot_is_rejected() {
        let snapshot = TuningSnapshot::from_words(&[0; TUNING_VALUE_COUNT]).unwrap();
        let mut tuning = ConsistentTuning::default();
        let mut scale = RegularScale::default();
        let result = snapshot.apply_to(&mut tuning, &mut scale);
        assert_eq!(result, Err(Error::InvalidScaleSystem(LatticeVector::new(0, 0))));
        assert_eq!(tuning, ConsistentTuning::default());
        assert_eq!(scale, RegularScale::default());
    }

    #[test]
    fn test_tuning_receiver_waits_for_frame() {
        let receiver = TuningDataReceiver::new();
        let mut tuning = ConsistentTuning::default();
        let mut scale = RegularScale::default();
        assert_eq!(receiver.snapshot(), None);
        assert_eq!(receiver.apply_to(&mut tuning, &mut scale), Ok(false));
    }
}
