//! Input entries for the OPL diff engine.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::event::{Event, Tempo};

/// One step of an OPL register log.
#[derive(Debug, Clone, PartialEq)]
pub enum OplEntry {
    /// Register write. `reg` 0x000-0x0FF addresses port 0, 0x100-0x1FF
    /// port 1.
    Write { reg: u16, val: u8 },
    /// Wait a number of ticks; makes the accumulated writes audible.
    Delay(u32),
    /// Tempo change.
    Tempo(Tempo),
}

/// Loosely typed OPL entry, as handed over by format readers.
///
/// Exactly one of `reg`/`val` (together), `delay` or `tempo` must be set.
/// Use `OplEntry::try_from` to validate it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OplRecord {
    #[serde(default)]
    pub reg: Option<u16>,
    #[serde(default)]
    pub val: Option<u8>,
    #[serde(default)]
    pub delay: Option<u32>,
    #[serde(default)]
    pub tempo: Option<Event>,
}

impl OplRecord {
    pub fn write(reg: u16, val: u8) -> Self {
        Self {
            reg: Some(reg),
            val: Some(val),
            ..Default::default()
        }
    }

    pub fn delay(ticks: u32) -> Self {
        Self {
            delay: Some(ticks),
            ..Default::default()
        }
    }

    pub fn tempo(tempo: Event) -> Self {
        Self {
            tempo: Some(tempo),
            ..Default::default()
        }
    }
}

impl TryFrom<&OplRecord> for OplEntry {
    type Error = Error;

    fn try_from(record: &OplRecord) -> Result<Self> {
        let has_write = record.reg.is_some() || record.val.is_some();
        let present = [has_write, record.delay.is_some(), record.tempo.is_some()]
            .iter()
            .filter(|p| **p)
            .count();

        if present == 0 {
            return Err(Error::MalformedEntry(
                "OPL entry has none of: register, delay, tempo".into(),
            ));
        }
        if present > 1 {
            return Err(Error::MalformedEntry(format!(
                "OPL entry must carry exactly one of register, delay, tempo: {:?}",
                record
            )));
        }

        if has_write {
            return match (record.reg, record.val) {
                (Some(reg), Some(val)) => Ok(OplEntry::Write { reg, val }),
                _ => Err(Error::MalformedEntry(
                    "OPL register write needs both reg and val".into(),
                )),
            };
        }

        if let Some(ticks) = record.delay {
            return Ok(OplEntry::Delay(ticks));
        }

        match record.tempo.as_ref().and_then(Event::as_tempo) {
            Some(tempo) => Ok(OplEntry::Tempo(*tempo)),
            None => Err(Error::InvalidArgument(
                "`tempo` property must be a tempo event".into(),
            )),
        }
    }
}

impl TryFrom<OplRecord> for OplEntry {
    type Error = Error;

    fn try_from(record: OplRecord) -> Result<Self> {
        OplEntry::try_from(&record)
    }
}
