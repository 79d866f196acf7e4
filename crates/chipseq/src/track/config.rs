//! Tracks, their channel configuration, and the standard classifiers.

use serde::{Deserialize, Serialize};

use crate::event::{Event, Origin};

/// MIDI channel reserved for percussion (channel 10, zero-based 9).
pub const MIDI_PERCUSSION_CHANNEL: u8 = 9;

/// Kind of channel a track plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Melodic OPL channel.
    Opl,
    /// OPL rhythm-mode percussion voice.
    OplRhythm,
    /// Melodic MIDI channel.
    Midi,
    /// MIDI percussion channel.
    MidiPercussion,
}

/// The channel an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelAssignment {
    pub channel_type: ChannelType,
    pub channel_index: usize,
}

impl ChannelAssignment {
    pub fn new(channel_type: ChannelType, channel_index: usize) -> Self {
        Self {
            channel_type,
            channel_index,
        }
    }
}

/// Channel configuration of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackConfiguration {
    pub channel_type: ChannelType,
    pub channel_index: usize,
    pub track_index: usize,
}

impl TrackConfiguration {
    pub fn assignment(&self) -> ChannelAssignment {
        ChannelAssignment::new(self.channel_type, self.channel_index)
    }
}

/// Timeline of one monophonic voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub events: Vec<Event>,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all delays in the track.
    pub fn duration(&self) -> u64 {
        self.events
            .iter()
            .filter_map(Event::delay_ticks)
            .map(u64::from)
            .sum()
    }
}

impl From<Vec<Event>> for Track {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

/// A set of tracks playing together, index-aligned with their
/// configurations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub tracks: Vec<Track>,
}

/// Classifier for events produced by the OPL diff engine.
///
/// Percussion voices get one track per role, melodic channels one per
/// channel. Untagged events (tempo, configuration) go to OPL channel 0.
pub fn opl_channel_assignment(ev: &Event) -> ChannelAssignment {
    match ev.origin {
        Some(Origin::Opl {
            rhythm: Some(role), ..
        }) => ChannelAssignment::new(ChannelType::OplRhythm, role.bit() as usize),
        Some(Origin::Opl { channel, .. }) => {
            ChannelAssignment::new(ChannelType::Opl, channel as usize)
        }
        _ => ChannelAssignment::new(ChannelType::Opl, 0),
    }
}

/// Classifier for events produced by the MIDI interpreter.
///
/// The channel index is the note's voice slot, which keeps every track
/// monophonic even when a MIDI channel plays chords. Untagged events go to
/// MIDI channel 0.
pub fn midi_channel_assignment(ev: &Event) -> ChannelAssignment {
    match ev.origin {
        Some(Origin::Midi { channel, subtrack }) => {
            let channel_type = if channel == MIDI_PERCUSSION_CHANNEL {
                ChannelType::MidiPercussion
            } else {
                ChannelType::Midi
            };
            ChannelAssignment::new(channel_type, subtrack)
        }
        _ => ChannelAssignment::new(ChannelType::Midi, 0),
    }
}
