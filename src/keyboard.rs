//! Physical layout of the 61-key hex controller
//!
//! Keys are numbered `0..61` from the bottom left. Rows alternate between six
//! and five keys, the short rows offset by half a key, which gives the hex
//! grid coordinates below: `x` is the row, `y` runs along the row.

use crate::grid::LatticeVector;

/// Number of keys on the controller
pub const KEY_COUNT: u8 = 61;
/// MIDI note sent by key 0
pub const BASE_MIDI_NOTE: u8 = 36;

const KEYS_PER_ROW_PAIR: u8 = 11;
const LONG_ROW: u8 = 6;

/// Keyboard coordinate of a key. Ids past the last key extend the grid upward.
pub fn key_id_to_coord(id: u8) -> LatticeVector {
    let u = (id % KEYS_PER_ROW_PAIR) as i32;
    let v = (id / KEYS_PER_ROW_PAIR) as i32;
    let long = LONG_ROW as i32;
    LatticeVector::new(2 * v + u / long, v + u % long + u / long)
}

/// Key at keyboard coordinate `c`, if there is one
pub fn coord_to_key_id(c: LatticeVector) -> Option<u8> {
    if c.x < 0 {
        return None;
    }
    let id = c.y + 6 * c.x - 2 * (c.x / 2) - c.x % 2;
    let id = u8::try_from(id).ok().filter(|&id| id < KEY_COUNT)?;
    (key_id_to_coord(id) == c).then_some(id)
}

/// MIDI note sent by key `id`
pub fn midi_note_for_key(id: u8) -> u8 {
    BASE_MIDI_NOTE + id
}

/// Key sending MIDI `note`, if it is on the keyboard
pub fn key_for_midi_note(note: u8) -> Option<u8> {
    note.checked_sub(BASE_MIDI_NOTE).filter(|&id| id < KEY_COUNT)
}

/// Key played by a 1V/oct control voltage, 0V being middle C (MIDI 60).
///
/// The controller spans roughly `[-2, 3]` volts; anything outside maps to
/// no key.
pub fn key_for_voltage(voltage: f32) -> Option<u8> {
    let note = (12.0 * (voltage + 5.0) + 0.5).floor();
    if !(0.0..=127.0).contains(&note) {
        return None;
    }
    key_for_midi_note(note as u8)
}

/// Every key with its coordinate, in id order
pub fn keys() -> impl Iterator<Item = (u8, LatticeVector)> {
    (0..KEY_COUNT).map(|id| (id, key_id_to_coord(id)))
}

/// Key ids grouped by physical row, bottom row first
pub fn rows() -> Vec<Vec<u8>> {
    let mut rows: Vec<Vec<u8>> = Vec::new();
    for (id, c) in keys() {
        let row = c.x as usize;
        if rows.len() <= row {
            rows.resize_with(row + 1, Vec::new);
        }
        rows[row].push(id);
    }
    rows
}
