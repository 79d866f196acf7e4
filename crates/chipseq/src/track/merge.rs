//! Per-channel tracks to a flat event stream.

use super::append_ticks;
use super::config::Track;
use crate::event::Event;

/// Playback position within one track.
struct Cursor<'a> {
    events: &'a [Event],
    pos: usize,
    /// Ticks until the event at `pos`, or until the track ends.
    wait: u64,
}

impl<'a> Cursor<'a> {
    fn new(track: &'a Track) -> Self {
        let mut cursor = Self {
            events: &track.events,
            pos: 0,
            wait: 0,
        };
        cursor.absorb_delays();
        cursor
    }

    fn absorb_delays(&mut self) {
        while let Some(ticks) = self.events.get(self.pos).and_then(Event::delay_ticks) {
            self.wait += u64::from(ticks);
            self.pos += 1;
        }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.events.len() && self.wait == 0
    }

    /// Emit the run of events due now, then wait for the next delay.
    fn emit(&mut self, output: &mut Vec<Event>) {
        while let Some(ev) = self.events.get(self.pos) {
            if ev.is_delay() {
                break;
            }
            output.push(ev.clone());
            self.pos += 1;
        }
        self.absorb_delays();
    }
}

/// Interleave `tracks` and append the result to `output`.
///
/// Events due at the same tick are emitted in ascending track order, each
/// track's run of simultaneous events kept together. Time between events
/// becomes a single delay, coalesced with a delay already at the end of
/// `output`. Delays at the end of a track are honoured, so the merged
/// stream is as long as the longest track.
pub fn merge(output: &mut Vec<Event>, tracks: &[Track]) {
    let mut cursors: Vec<Cursor<'_>> = tracks.iter().map(Cursor::new).collect();

    loop {
        let Some(next) = cursors
            .iter()
            .filter(|c| !c.is_done())
            .map(|c| c.wait)
            .min()
        else {
            break;
        };

        if next > 0 {
            append_ticks(output, next);
            for cursor in cursors.iter_mut().filter(|c| !c.is_done()) {
                cursor.wait -= next;
            }
            continue;
        }

        for cursor in cursors.iter_mut() {
            if cursor.wait == 0 {
                cursor.emit(output);
            }
        }
    }
}
