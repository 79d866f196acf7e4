//! Pool of monophonic voice slots.
//!
//! Every sounding MIDI note occupies one slot. A slot belongs to the
//! channel that first used it; once its note is released it goes on that
//! channel's free list and is handed out again to the channel's next note.
//! Slots are never removed, so a slot index is a stable handle that the
//! track splitter can use as a monophonic track id.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Upper bound on the number of slots. Exceeding it means notes are being
/// started and never released.
pub const MAX_VOICES: usize = 256;

/// A single monophonic voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSlot {
    pub channel: u8,
    /// Note playing in this slot, `None` when free.
    pub note: Option<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct VoicePool {
    slots: Vec<VoiceSlot>,
    /// Free slot indices per channel. Ordered so the lowest index is
    /// reused first.
    free: BTreeMap<u8, BTreeSet<usize>>,
}

impl VoicePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `note` on a free slot of `channel`, allocating a new slot if
    /// the channel has none free. Returns the slot index.
    pub fn acquire(&mut self, channel: u8, note: u8) -> Result<usize> {
        let reused = self
            .free
            .get_mut(&channel)
            .and_then(|free| free.pop_first());
        if let Some(idx) = reused {
            self.slots[idx].note = Some(note);
            return Ok(idx);
        }

        if self.slots.len() >= MAX_VOICES {
            return Err(Error::CapacityExceeded { limit: MAX_VOICES });
        }
        self.slots.push(VoiceSlot {
            channel,
            note: Some(note),
        });
        Ok(self.slots.len() - 1)
    }

    /// Release the lowest slot playing `note` on `channel`. Returns the slot
    /// index, or `None` if no such note is playing.
    pub fn release(&mut self, channel: u8, note: u8) -> Option<usize> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.channel == channel && s.note == Some(note))?;
        self.slots[idx].note = None;
        self.free.entry(channel).or_default().insert(idx);
        Some(idx)
    }

    pub fn get(&self, index: usize) -> Option<&VoiceSlot> {
        self.slots.get(index)
    }

    /// Number of slots ever allocated.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently holding a note.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.note.is_some()).count()
    }
}
