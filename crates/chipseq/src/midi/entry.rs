//! Input entries for the MIDI interpreter.

use serde::Deserialize;

use crate::error::{Error, Result};

/// One decoded MIDI message, or a delay between messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEntry {
    Delay(u32),
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NotePressure { channel: u8, note: u8, pressure: u8 },
    Controller { channel: u8, controller: u8, value: u8 },
    Patch { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, value: u16 },
    Meta { meta_type: u8, data: Vec<u8> },
    SysEx(Vec<u8>),
}

/// Loosely typed MIDI entry, as handed over by format readers.
///
/// Either `delay` alone (optionally with `type: "delay"`), or a named
/// `type` with its fields. Use `MidiEntry::try_from` to validate it.
///
/// ```
/// use chipseq::midi::{MidiEntry, MidiRecord};
///
/// let record = MidiRecord {
///     kind: Some("noteOn".into()),
///     channel: Some(2),
///     note: Some(60),
///     velocity: Some(100),
///     ..Default::default()
/// };
/// assert_eq!(
///     MidiEntry::try_from(&record).unwrap(),
///     MidiEntry::NoteOn { channel: 2, note: 60, velocity: 100 }
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidiRecord {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub delay: Option<u32>,
    pub channel: Option<u8>,
    pub note: Option<u8>,
    pub velocity: Option<u8>,
    pub pressure: Option<u8>,
    pub controller: Option<u8>,
    pub value: Option<u16>,
    pub patch: Option<u8>,
    pub meta_type: Option<u8>,
    pub data: Option<Vec<u8>>,
}

/// Highest channel number.
const MAX_CHANNEL: u8 = 15;
/// Highest value of a 7-bit data byte.
const MAX_DATA: u8 = 0x7F;
/// Highest 14-bit pitch bend value.
const MAX_PITCH_BEND: u16 = 0x3FFF;

fn required<T: Copy>(field: Option<T>, name: &str, kind: &str) -> Result<T> {
    field.ok_or_else(|| Error::MalformedEntry(format!("\"{}\" entry is missing `{}`", kind, name)))
}

fn byte(value: u16, name: &str, kind: &str) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        Error::MalformedEntry(format!("\"{}\" entry has out-of-range `{}`: {}", kind, name, value))
    })
}

fn check(value: u8, max: u8, name: &str) -> Result<()> {
    if value > max {
        return Err(Error::MalformedEntry(format!(
            "MIDI {} out of range: {} > {}",
            name, value, max
        )));
    }
    Ok(())
}

impl MidiEntry {
    /// Check channel and data byte ranges: channels 0-15, data bytes
    /// 0-127, pitch bend 0-16383.
    ///
    /// ```
    /// use chipseq::midi::MidiEntry;
    ///
    /// assert!(MidiEntry::Patch { channel: 15, program: 127 }.validate().is_ok());
    /// assert!(MidiEntry::Patch { channel: 16, program: 5 }.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        match self {
            MidiEntry::Delay(_) | MidiEntry::Meta { .. } | MidiEntry::SysEx(_) => Ok(()),
            MidiEntry::NoteOn {
                channel,
                note,
                velocity,
            }
            | MidiEntry::NoteOff {
                channel,
                note,
                velocity,
            } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                check(*note, MAX_DATA, "note")?;
                check(*velocity, MAX_DATA, "velocity")
            }
            MidiEntry::NotePressure {
                channel,
                note,
                pressure,
            } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                check(*note, MAX_DATA, "note")?;
                check(*pressure, MAX_DATA, "pressure")
            }
            MidiEntry::Controller {
                channel,
                controller,
                value,
            } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                check(*controller, MAX_DATA, "controller")?;
                check(*value, MAX_DATA, "value")
            }
            MidiEntry::Patch { channel, program } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                check(*program, MAX_DATA, "program")
            }
            MidiEntry::ChannelPressure { channel, pressure } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                check(*pressure, MAX_DATA, "pressure")
            }
            MidiEntry::PitchBend { channel, value } => {
                check(*channel, MAX_CHANNEL, "channel")?;
                if *value > MAX_PITCH_BEND {
                    return Err(Error::MalformedEntry(format!(
                        "MIDI pitch bend out of range: {} > {}",
                        value, MAX_PITCH_BEND
                    )));
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<&MidiRecord> for MidiEntry {
    type Error = Error;

    fn try_from(r: &MidiRecord) -> Result<Self> {
        let kind = match (r.kind.as_deref(), r.delay) {
            (None | Some("delay"), Some(ticks)) => return Ok(MidiEntry::Delay(ticks)),
            (None, None) => {
                return Err(Error::MalformedEntry(
                    "MIDI entry has neither a type nor a delay".into(),
                ));
            }
            (Some("delay"), None) => {
                return Err(Error::MalformedEntry("\"delay\" entry is missing `delay`".into()));
            }
            (Some(kind), Some(_)) => {
                return Err(Error::MalformedEntry(format!(
                    "\"{}\" entry must not carry a delay",
                    kind
                )));
            }
            (Some(kind), None) => kind,
        };

        let channel = || required(r.channel, "channel", kind);
        let note = || required(r.note, "note", kind);

        let entry = match kind {
            "noteOn" => MidiEntry::NoteOn {
                channel: channel()?,
                note: note()?,
                velocity: required(r.velocity, "velocity", kind)?,
            },
            "noteOff" => MidiEntry::NoteOff {
                channel: channel()?,
                note: note()?,
                velocity: r.velocity.unwrap_or(0),
            },
            "notePressure" => MidiEntry::NotePressure {
                channel: channel()?,
                note: note()?,
                pressure: required(r.pressure, "pressure", kind)?,
            },
            "controller" => MidiEntry::Controller {
                channel: channel()?,
                controller: required(r.controller, "controller", kind)?,
                value: byte(required(r.value, "value", kind)?, "value", kind)?,
            },
            "patch" => MidiEntry::Patch {
                channel: channel()?,
                program: required(r.patch, "patch", kind)?,
            },
            "channelPressure" => MidiEntry::ChannelPressure {
                channel: channel()?,
                pressure: required(r.pressure, "pressure", kind)?,
            },
            "pitchbend" => MidiEntry::PitchBend {
                channel: channel()?,
                value: required(r.value, "value", kind)?,
            },
            "meta" => MidiEntry::Meta {
                meta_type: required(r.meta_type, "metaType", kind)?,
                data: r.data.clone().unwrap_or_default(),
            },
            "sysex" => MidiEntry::SysEx(r.data.clone().unwrap_or_default()),
            other => return Err(Error::UnsupportedEntryKind(other.to_string())),
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl TryFrom<MidiRecord> for MidiEntry {
    type Error = Error;

    fn try_from(record: MidiRecord) -> Result<Self> {
        MidiEntry::try_from(&record)
    }
}
