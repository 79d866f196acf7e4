//! MIDI pitch and tempo conversions.

use super::entry::MidiEntry;
use crate::binutil::{self, ParseError};
use crate::event::Tempo;

/// Meta event type for "set tempo".
pub const META_SET_TEMPO: u8 = 0x51;
/// Meta event type for "end of track".
pub const META_END_OF_TRACK: u8 = 0x2F;

const PITCHBEND_MIN: i32 = 0;
const PITCHBEND_MAX: i32 = 16383;
const PITCHBEND_CENTRE: i32 = 8192;

/// Lowest frequency representable without bending below note 0.
const NOTE_0_HZ: f64 = 8.175;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Frequency in Hz of MIDI note `note` (A4 = 69 = 440 Hz).
pub fn midi_to_frequency(note: f64) -> f64 {
    440.0 * 2_f64.powf((note - 69.0) / 12.0)
}

/// Fractional MIDI note number of `hertz`.
pub fn frequency_to_midi(hertz: f64) -> f64 {
    12.0 * (hertz / 440.0).log2() + 69.0
}

/// A frequency expressed as a MIDI note plus pitchbend.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteBend {
    /// Note number, 0-127.
    pub note: u8,
    /// 14-bit pitchbend, 8192 is centre. One semitone is 4096 units.
    pub bend: u16,
    pub octave: u8,
    /// Semitone within the octave, 0 = C.
    pub semitone: u8,
    /// Note name such as "C-4" or "C#4".
    pub name: String,
}

/// Express `hertz` as a MIDI note and the pitchbend needed to reach it.
///
/// When `current_note` is given the bend is computed relative to that note
/// instead of the nearest one. Frequencies at or below note 0 clamp to note
/// 0 without bend, out-of-range bends are clamped and notes above 127 clamp
/// to 127.
pub fn frequency_to_midi_bend(hertz: f64, current_note: Option<u8>) -> NoteBend {
    let (note, bend) = if hertz <= NOTE_0_HZ {
        (0, PITCHBEND_CENTRE)
    } else {
        let float_note = frequency_to_midi(hertz);
        let note = match current_note {
            Some(n) => n as i32,
            None => float_note.round() as i32,
        };
        let bend = (PITCHBEND_CENTRE as f64 + (float_note - note as f64) * 4096.0).round() as i32;
        let bend = bend.clamp(PITCHBEND_MIN, PITCHBEND_MAX);
        if note > 0x7F {
            log::debug!("frequency {} Hz needs out-of-range MIDI note {}", hertz, note);
        }
        (note.clamp(0, 0x7F), bend)
    };

    let octave = (note / 12) as u8;
    let semitone = (note % 12) as u8;
    let base = NOTE_NAMES[semitone as usize];
    let sep = if base.len() == 1 { "-" } else { "" };
    NoteBend {
        note: note as u8,
        bend: bend as u16,
        octave,
        semitone,
        name: format!("{}{}{}", base, sep, octave),
    }
}

/// Decode the payload of a "set tempo" meta event into µs per quarter
/// note.
pub fn decode_tempo_payload(data: &[u8]) -> Result<u32, ParseError> {
    binutil::read_u24_be_at(data, 0)
}

/// Encode `tempo` as a "set tempo" meta entry, for embedding tempo changes
/// in General MIDI data.
pub fn tempo_to_meta(tempo: &Tempo) -> Result<MidiEntry, ParseError> {
    let data = binutil::write_u24_be(tempo.us_per_quarter_note())?;
    Ok(MidiEntry::Meta {
        meta_type: META_SET_TEMPO,
        data: data.to_vec(),
    })
}
