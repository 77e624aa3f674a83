//! Note letters, accidentals and octaves to MIDI values.
//!
//! Octaves count from 0 with no offset, so `c` in octave 5 is MIDI 60.

/// Highest MIDI data byte.
pub const MIDI_MAX: u8 = 127;

/// Highest MIDI channel (zero-based).
pub const CHANNEL_MAX: u8 = 15;

/// Semitone offset of a note letter within the octave. Case-insensitive.
pub fn letter_value(letter: char) -> Option<i32> {
    match letter.to_ascii_lowercase() {
        'c' => Some(0),
        'd' => Some(2),
        'e' => Some(4),
        'f' => Some(5),
        'g' => Some(7),
        'a' => Some(9),
        'b' => Some(11),
        _ => None,
    }
}

/// Net semitone shift of stacked accidentals: `#` raises, `b` lowers.
pub fn accidental_offset(accidental: &str) -> i32 {
    accidental
        .chars()
        .map(|ch| match ch {
            '#' => 1,
            'b' => -1,
            _ => 0,
        })
        .sum()
}

/// MIDI note number for a written note, clamped to 0-127.
pub fn midi_pitch(letter: char, accidental: &str, octave: u32) -> u8 {
    let base = letter_value(letter).unwrap_or(0) as i64;
    let value = base + accidental_offset(accidental) as i64 + 12 * octave as i64;
    value.clamp(0, MIDI_MAX as i64) as u8
}

/// Move `pitch` by `delta` semitones, staying within 0-127.
pub fn transpose(pitch: u8, delta: i32) -> u8 {
    (pitch as i64 + delta as i64).clamp(0, MIDI_MAX as i64) as u8
}

/// MIDI velocity for a velocity code 0-9 written as `!n`.
///
/// Codes map linearly onto the velocity range: `!0` is 12 and `!9` is 127.
pub fn velocity_from_code(code: u8) -> u8 {
    let code = code.min(9) as u32;
    (MIDI_MAX as u32 * (code + 1) / 10) as u8
}

pub fn clamp_channel(channel: u32) -> u8 {
    channel.min(CHANNEL_MAX as u32) as u8
}
