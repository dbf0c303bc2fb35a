#![allow(dead_code)]

use pitchgrid::datalink::{TuningDataReceiver, TuningDataSender};
use pitchgrid::LatticeVector;

pub fn v(x: i32, y: i32) -> LatticeVector {
    LatticeVector::new(x, y)
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {} +/- {}, got {}",
        what,
        expected,
        tolerance,
        actual
    );
}

/// Every lattice point in a square around the origin
pub fn lattice_points(radius: i32) -> impl Iterator<Item = LatticeVector> {
    (-radius..=radius).flat_map(move |x| (-radius..=radius).map(move |y| v(x, y)))
}

/// Clocks `ticks` samples from the sender into the receiver, returning the
/// samples sent
pub fn run_link(sender: &mut TuningDataSender, receiver: &mut TuningDataReceiver, ticks: usize) -> Vec<f32> {
    (0..ticks)
        .map(|_| {
            let sample = sender.tick();
            receiver.tick(sample);
            sample
        })
        .collect()
}
