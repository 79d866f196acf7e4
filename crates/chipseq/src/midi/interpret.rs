//! Raw MIDI entries to events.

use super::convert::{self, META_END_OF_TRACK, META_SET_TEMPO};
use super::entry::MidiEntry;
use super::voice::VoicePool;
use crate::error::{Error, Result};
use crate::event::{self, Event, Origin, Tempo};
use crate::patch::{MidiPatch, Patch, PatchRegistry};

/// Number of MIDI channels.
const MIDI_CHANNELS: usize = 16;

/// Events produced by one interpreter call, plus the tempo in effect at
/// its end.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiOutput {
    pub events: Vec<Event>,
    /// Pass this as `last_tempo` to the next call (e.g. the next track of a
    /// multi-track file).
    pub last_tempo: Tempo,
}

/// Converts decoded MIDI messages into events.
///
/// The interpreter does not emit an initial tempo event: for multi-track
/// sources it is called once per track, and only the caller knows where
/// the song's starting tempo belongs.
#[derive(Debug, Clone)]
pub struct MidiInterpreter {
    default_program: u8,
}

impl Default for MidiInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiInterpreter {
    /// Create an interpreter that plays notes on channels with no program
    /// change using program 0 (acoustic grand piano).
    pub fn new() -> Self {
        Self { default_program: 0 }
    }

    /// Use `program` for channels that play notes before any program
    /// change. Programs above 127 make [`interpret`](Self::interpret) fail
    /// with `InvalidArgument`.
    pub fn with_default_program(mut self, program: u8) -> Self {
        self.default_program = program;
        self
    }

    /// Interpret `entries`, resolving instruments through `patches`.
    ///
    /// Every entry is range-checked with [`MidiEntry::validate`] first.
    /// New patches go to a copy of the registry that replaces `patches`
    /// only on success, so on error the caller's registry is unchanged.
    pub fn interpret(
        &self,
        entries: &[MidiEntry],
        patches: &mut PatchRegistry,
        last_tempo: &Tempo,
    ) -> Result<MidiOutput> {
        if self.default_program > 0x7F {
            return Err(Error::InvalidArgument(format!(
                "default MIDI program out of range: {}",
                self.default_program
            )));
        }
        entries.iter().try_for_each(MidiEntry::validate)?;
        let mut staged = patches.clone();
        let out = self.run(entries, &mut staged, last_tempo)?;
        *patches = staged;
        Ok(out)
    }

    /// Interpret validated entries.
    fn run(
        &self,
        entries: &[MidiEntry],
        patches: &mut PatchRegistry,
        last_tempo: &Tempo,
    ) -> Result<MidiOutput> {
        let mut events = Vec::new();
        let mut voices = VoicePool::new();
        let mut channel_patch: [Option<usize>; MIDI_CHANNELS] = [None; MIDI_CHANNELS];
        let mut tempo = *last_tempo;

        for entry in entries {
            match entry {
                MidiEntry::Delay(ticks) => event::append_delay(&mut events, *ticks),

                MidiEntry::NoteOn {
                    channel,
                    note,
                    velocity,
                } if *velocity > 0 => {
                    let subtrack = voices.acquire(*channel, *note)?;
                    let slot = &mut channel_patch[usize::from(*channel)];
                    let instrument = *slot.get_or_insert_with(|| {
                        patches.find_or_insert(Patch::Midi(MidiPatch {
                            bank: 0,
                            program: self.default_program,
                        }))
                    });
                    events.push(
                        Event::note_on(
                            convert::midi_to_frequency(*note as f64),
                            *velocity as f64 / 127.0,
                            instrument,
                        )
                        .with_origin(Origin::Midi {
                            channel: *channel,
                            subtrack,
                        }),
                    );
                }

                // Note-on with zero velocity is a note-off.
                MidiEntry::NoteOn { channel, note, .. } | MidiEntry::NoteOff { channel, note, .. } => {
                    match voices.release(*channel, *note) {
                        Some(subtrack) => events.push(Event::note_off().with_origin(Origin::Midi {
                            channel: *channel,
                            subtrack,
                        })),
                        None => log::debug!(
                            "note-off for channel {} note {} with no note playing",
                            channel,
                            note
                        ),
                    }
                }

                MidiEntry::Patch { channel, program } => {
                    let idx = patches.find_or_insert(Patch::Midi(MidiPatch {
                        bank: 0,
                        program: *program,
                    }));
                    channel_patch[usize::from(*channel)] = Some(idx);
                }

                MidiEntry::Meta { meta_type, data } => match *meta_type {
                    META_SET_TEMPO => {
                        let us = convert::decode_tempo_payload(data)?;
                        let mut t = tempo;
                        t.set_us_per_quarter_note(us);
                        log::debug!(
                            "tempo change to {} us/quarter-note ({} us/tick)",
                            t.us_per_quarter_note(),
                            t.us_per_tick()
                        );
                        events.push(Event::tempo(t));
                        tempo = t;
                    }
                    META_END_OF_TRACK => {}
                    other => log::debug!("MIDI meta event 0x{:02X} not implemented", other),
                },

                MidiEntry::NotePressure { .. }
                | MidiEntry::Controller { .. }
                | MidiEntry::ChannelPressure { .. }
                | MidiEntry::PitchBend { .. }
                | MidiEntry::SysEx(_) => {
                    log::trace!("ignoring {:?}", entry);
                }
            }
        }

        Ok(MidiOutput {
            events,
            last_tempo: tempo,
        })
    }
}
