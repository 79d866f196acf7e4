//! Flat event stream to per-channel tracks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::append_ticks;
use super::config::{ChannelAssignment, Pattern, Track, TrackConfiguration};
use crate::event::Event;

/// Result of [`split`]: one configuration per track, index-aligned with
/// `pattern.tracks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub track_configurations: Vec<TrackConfiguration>,
    pub pattern: Pattern,
}

/// Split `events` into one track per channel reported by `classify`.
///
/// `classify` is called once for every non-delay event, in stream order.
/// Tracks are numbered in order of first appearance. Delays are rewritten
/// per track: before each event a track receives, it gets one delay
/// covering the time since its previous event. Delay at the end of the
/// stream goes to the track that received the last event.
pub fn split<F>(events: &[Event], mut classify: F) -> Split
where
    F: FnMut(&Event) -> ChannelAssignment,
{
    let mut out = Split::default();
    let mut index: HashMap<ChannelAssignment, usize> = HashMap::new();
    // Tick position of each track's latest event.
    let mut flushed: Vec<u64> = Vec::new();
    let mut elapsed: u64 = 0;
    let mut last_routed = None;

    for ev in events {
        if let Some(ticks) = ev.delay_ticks() {
            elapsed += u64::from(ticks);
            continue;
        }

        let assignment = classify(ev);
        let track_index = *index.entry(assignment).or_insert_with(|| {
            let track_index = out.pattern.tracks.len();
            log::debug!(
                "new track {} for {:?} channel {}",
                track_index,
                assignment.channel_type,
                assignment.channel_index
            );
            out.track_configurations.push(TrackConfiguration {
                channel_type: assignment.channel_type,
                channel_index: assignment.channel_index,
                track_index,
            });
            out.pattern.tracks.push(Track::new());
            flushed.push(0);
            track_index
        });

        let track = &mut out.pattern.tracks[track_index].events;
        append_ticks(track, elapsed - flushed[track_index]);
        track.push(ev.clone());
        flushed[track_index] = elapsed;
        last_routed = Some(track_index);
    }

    if let Some(track_index) = last_routed {
        append_ticks(
            &mut out.pattern.tracks[track_index].events,
            elapsed - flushed[track_index],
        );
    }

    out
}
