// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! MIDI note number to note name conversion.
//!
//! Note names use sharps and scientific pitch notation, so MIDI 60 is `C4` and
//! MIDI 21 is `A0`.

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Converts a MIDI note number to its note name (e.g. 61 -> "C#4").
pub fn midi_to_note(midi: u8) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(midi % 12) as usize], octave)
}

/// Parses a note name back into a MIDI note number.
///
/// Accepts `#` or `s` for sharps and `b` for flats, so "D#1", "Ds1" and "Eb1"
/// all resolve to 27. Returns None for anything outside 0-127.
pub fn note_to_midi(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let rest = chars.as_str();
    let (offset, octave) = match rest.chars().next()? {
        '#' | 's' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;

    let midi = (octave + 1) * 12 + base + offset;
    u8::try_from(midi).ok().filter(|m| *m <= 127)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_to_note() {
        assert_eq!(midi_to_note(60), "C4");
        assert_eq!(midi_to_note(21), "A0");
        assert_eq!(midi_to_note(27), "D#1");
        assert_eq!(midi_to_note(108), "C8");
        assert_eq!(midi_to_note(0), "C-1");
        assert_eq!(midi_to_note(127), "G9");
    }

    #[test]
    fn test_note_to_midi_accidentals() {
        assert_eq!(note_to_midi("C4"), Some(60));
        assert_eq!(note_to_midi("D#1"), Some(27));
        assert_eq!(note_to_midi("Ds1"), Some(27));
        assert_eq!(note_to_midi("Eb1"), Some(27));
        assert_eq!(note_to_midi("C-1"), Some(0));
    }

    #[test]
    fn test_note_to_midi_invalid() {
        assert_eq!(note_to_midi(""), None);
        assert_eq!(note_to_midi("H4"), None);
        assert_eq!(note_to_midi("C"), None);
        assert_eq!(note_to_midi("G#9"), None);
        assert_eq!(note_to_midi("Cb-1"), None);
    }

    #[test]
    fn test_round_trip() {
        for midi in 0..=127u8 {
            assert_eq!(note_to_midi(&midi_to_note(midi)), Some(midi));
        }
    }
}
