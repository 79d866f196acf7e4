//! Raw MIDI messages to events.
//!
//! Format readers decode their container into a flat list of
//! [`MidiEntry`] values (or loosely typed [`MidiRecord`]s); the interpreter
//! turns those into events, placing every sounding note in its own voice
//! slot so the result can later be split into monophonic tracks.
//!
//! # Examples
//!
//! ```rust
//! use chipseq::event::{EventKind, Tempo};
//! use chipseq::midi::{self, MidiEntry};
//! use chipseq::patch::PatchRegistry;
//!
//! let entries = [
//!     MidiEntry::Patch { channel: 0, program: 5 },
//!     MidiEntry::NoteOn { channel: 0, note: 69, velocity: 127 },
//!     MidiEntry::Delay(48),
//!     MidiEntry::NoteOff { channel: 0, note: 69, velocity: 0 },
//! ];
//! let mut patches = PatchRegistry::new();
//! let out = midi::parse_midi(&entries, &mut patches, &Tempo::default()).unwrap();
//!
//! assert_eq!(out.events.len(), 3);
//! assert!(matches!(out.events[0].kind, EventKind::NoteOn { frequency, .. } if frequency == 440.0));
//! assert_eq!(patches.len(), 1);
//! ```

pub mod convert;
pub mod entry;
pub mod interpret;
pub mod voice;

pub use convert::{frequency_to_midi, midi_to_frequency};
pub use entry::{MidiEntry, MidiRecord};
pub use interpret::{MidiInterpreter, MidiOutput};
pub use voice::{MAX_VOICES, VoicePool, VoiceSlot};

use crate::error::Result;
use crate::event::Tempo;
use crate::patch::PatchRegistry;

/// Interpret MIDI entries with the default interpreter settings.
pub fn parse_midi(
    entries: &[MidiEntry],
    patches: &mut PatchRegistry,
    last_tempo: &Tempo,
) -> Result<MidiOutput> {
    MidiInterpreter::new().interpret(entries, patches, last_tempo)
}

/// Validate loosely typed records, then interpret them.
///
/// Every record is validated first, so a bad record leaves `patches`
/// untouched.
pub fn parse_midi_records(
    records: &[MidiRecord],
    patches: &mut PatchRegistry,
    last_tempo: &Tempo,
) -> Result<MidiOutput> {
    let entries = records
        .iter()
        .map(MidiEntry::try_from)
        .collect::<Result<Vec<_>>>()?;
    parse_midi(&entries, patches, last_tempo)
}
