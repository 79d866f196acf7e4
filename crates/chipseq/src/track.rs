//! Splitting a flat event stream into per-voice tracks, and merging tracks
//! back together.
//!
//! A flat stream interleaves events from every channel with shared delays.
//! [`split`] routes each event to a monophonic [`Track`] chosen by a
//! classifier, rewriting the delays so every track keeps its own timing.
//! [`merge`] interleaves tracks back into one stream.
//!
//! ```rust
//! use chipseq::event::{Event, Origin};
//! use chipseq::track::{self, ChannelType};
//!
//! let tag = |channel| Origin::Opl { channel, rhythm: None };
//! let events = vec![
//!     Event::note_on(110.0, 1.0, 0).with_origin(tag(0)),
//!     Event::note_on(220.0, 1.0, 0).with_origin(tag(1)),
//!     Event::delay(20),
//!     Event::note_off().with_origin(tag(0)),
//!     Event::delay(10),
//!     Event::note_off().with_origin(tag(1)),
//! ];
//!
//! let split = track::split(&events, track::opl_channel_assignment);
//! assert_eq!(split.track_configurations.len(), 2);
//! assert_eq!(split.track_configurations[1].channel_type, ChannelType::Opl);
//! assert_eq!(split.pattern.tracks[1].events[1], Event::delay(30));
//!
//! let mut merged = Vec::new();
//! track::merge(&mut merged, &split.pattern.tracks);
//! assert_eq!(merged.len(), events.len());
//! ```

pub mod config;
pub mod merge;
pub mod split;

pub use config::{
    ChannelAssignment, ChannelType, MIDI_PERCUSSION_CHANNEL, Pattern, Track, TrackConfiguration,
    midi_channel_assignment, opl_channel_assignment,
};
pub use merge::merge;
pub use split::{Split, split};

use crate::event::{self, Event};

/// Append `ticks` as delay, splitting values wider than a single delay
/// event can hold.
pub(crate) fn append_ticks(events: &mut Vec<Event>, mut ticks: u64) {
    while ticks > 0 {
        let chunk = u32::try_from(ticks).unwrap_or(u32::MAX);
        event::append_delay(events, chunk);
        ticks -= u64::from(chunk);
    }
}
