//! Per-triangle paint state encoding
//!
//! Bambu Studio stores a triangle's extruder assignment as a string of hex
//! nibbles in the `paint_color` attribute. Each nibble holds two split bits
//! (always zero here, the triangle is never subdivided) and a two-bit state.
//! A state of 3 escapes to an extended form where following nibbles carry
//! `state - 3` in steps of at most 15.
//!
//! The reader consumes nibbles from the end of the string, so the extended
//! form is produced in reading order and then reversed.

/// Largest value a single continuation nibble carries
const NIBBLE_MAX: u32 = 15;

/// First state that needs the extended form
const EXTENDED_BASE: u32 = 3;

/// Encode an extruder state; state 0 means "object default" and encodes to `""`
pub fn encode_paint_state(state: u32) -> String {
    match state {
        0 => String::new(),
        1 | 2 => hex_digit((state & 1) * 4 + ((state >> 1) & 1) * 8).to_string(),
        _ => {
            let mut ext = state - EXTENDED_BASE;
            let mut nibbles = vec!['C'];
            while ext >= NIBBLE_MAX {
                nibbles.push('F');
                ext -= NIBBLE_MAX;
            }
            nibbles.push(hex_digit(ext));
            nibbles.into_iter().rev().collect()
        }
    }
}

/// Decode a leaf paint state the way the slicer does
///
/// Returns `None` for strings that are not a single unsplit leaf.
pub fn decode_paint_state(encoded: &str) -> Option<u32> {
    if encoded.is_empty() {
        return Some(0);
    }

    let mut nibbles = encoded.chars().rev().map(|c| c.to_digit(16));
    let first = nibbles.next()??;
    if first & 0b11 != 0 {
        return None;
    }

    let state = first >> 2;
    if state != EXTENDED_BASE {
        return (nibbles.next().is_none()).then_some(state);
    }

    let mut ext = 0;
    loop {
        let nibble = nibbles.next()??;
        ext += nibble;
        if nibble != NIBBLE_MAX {
            break;
        }
    }
    nibbles.next().is_none().then_some(ext + EXTENDED_BASE)
}

fn hex_digit(value: u32) -> char {
    char::from_digit(value, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0')
}
