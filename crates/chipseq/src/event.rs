//! Canonical musical events.
//!
//! Every engine in this crate produces the same small vocabulary of
//! events. Each event may carry an [`Origin`] describing which chip channel
//! or MIDI voice it came from; the track splitter uses that tag to route it.

use serde::{Deserialize, Serialize};

/// Tempo of the song.
///
/// The per-tick duration is derived from the quarter-note length and the
/// tick resolution, so cloning a `Tempo` always carries a consistent
/// `us_per_tick()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tempo {
    us_per_quarter_note: u32,
    ticks_per_quarter_note: u32,
}

impl Tempo {
    /// Create a tempo from a quarter-note length in microseconds and a tick
    /// resolution. A resolution of zero is treated as one tick per quarter
    /// note.
    pub fn new(us_per_quarter_note: u32, ticks_per_quarter_note: u32) -> Self {
        Self {
            us_per_quarter_note,
            ticks_per_quarter_note: ticks_per_quarter_note.max(1),
        }
    }

    pub fn us_per_quarter_note(&self) -> u32 {
        self.us_per_quarter_note
    }

    pub fn ticks_per_quarter_note(&self) -> u32 {
        self.ticks_per_quarter_note
    }

    /// Change the quarter-note length, keeping the tick resolution.
    pub fn set_us_per_quarter_note(&mut self, us: u32) {
        self.us_per_quarter_note = us;
    }

    /// Duration of one tick in microseconds.
    pub fn us_per_tick(&self) -> f64 {
        self.us_per_quarter_note as f64 / self.ticks_per_quarter_note as f64
    }

    /// Ticks elapsed per second of playback.
    pub fn ticks_per_second(&self) -> f64 {
        1_000_000.0 / self.us_per_tick()
    }

    /// Beats (quarter notes) per minute.
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.us_per_quarter_note as f64
    }
}

impl Default for Tempo {
    /// 120 BPM at 48 ticks per quarter note.
    fn default() -> Self {
        Self::new(500_000, 48)
    }
}

/// Global options toggled by a configuration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigOption {
    /// Placeholder that does nothing, used to pad timelines.
    EmptyEvent,
    /// OPL3 (second register bank, 4-operator voices) enable.
    EnableOpl3,
    EnableDeepTremolo,
    EnableDeepVibrato,
    /// Percussion mode on channels 6, 7 and 8.
    EnableRhythm,
    /// Waveform-select enable on OPL2.
    EnableWaveSel,
}

/// Percussion role of an OPL rhythm-mode voice.
///
/// The discriminant is the voice's key-on bit within register 0xBD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RhythmRole {
    HiHat = 0,
    TopCymbal = 1,
    TomTom = 2,
    SnareDrum = 3,
    BassDrum = 4,
}

impl RhythmRole {
    /// Key-on bit index within register 0xBD.
    pub fn bit(self) -> u8 {
        self as u8
    }
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// OPL channel (0-17), plus the percussion role in rhythm mode.
    Opl {
        channel: u8,
        rhythm: Option<RhythmRole>,
    },
    /// MIDI channel (0-15) and the voice slot the note was placed in.
    Midi { channel: u8, subtrack: usize },
}

/// The payload of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Wait before processing the following events.
    Delay { ticks: u32 },
    /// Start a note. `velocity` is linear in `[0, 1]` and `instrument` is an
    /// index into the patch registry.
    NoteOn {
        frequency: f64,
        velocity: f64,
        instrument: usize,
    },
    /// Stop the note playing on the event's voice.
    NoteOff,
    Tempo(Tempo),
    Configuration { option: ConfigOption, value: bool },
    /// Change a playing note without retriggering it.
    Effect {
        pitchbend: Option<f64>,
        volume: Option<f64>,
    },
}

/// A single musical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub origin: Option<Origin>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, origin: None }
    }

    /// Tag the event with the channel it came from.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn delay(ticks: u32) -> Self {
        Self::new(EventKind::Delay { ticks })
    }

    pub fn note_on(frequency: f64, velocity: f64, instrument: usize) -> Self {
        Self::new(EventKind::NoteOn {
            frequency,
            velocity,
            instrument,
        })
    }

    pub fn note_off() -> Self {
        Self::new(EventKind::NoteOff)
    }

    pub fn tempo(tempo: Tempo) -> Self {
        Self::new(EventKind::Tempo(tempo))
    }

    pub fn configuration(option: ConfigOption, value: bool) -> Self {
        Self::new(EventKind::Configuration { option, value })
    }

    /// Tick count if this is a delay event.
    pub fn delay_ticks(&self) -> Option<u32> {
        match self.kind {
            EventKind::Delay { ticks } => Some(ticks),
            _ => None,
        }
    }

    pub fn is_delay(&self) -> bool {
        matches!(self.kind, EventKind::Delay { .. })
    }

    pub fn as_tempo(&self) -> Option<&Tempo> {
        match &self.kind {
            EventKind::Tempo(t) => Some(t),
            _ => None,
        }
    }
}

/// Append a delay to `events`, extending the last event instead when it is
/// already a delay. Zero-length delays are dropped.
///
/// A sum that does not fit in `u32` starts a new delay event, so this is
/// the one case where two delays end up adjacent.
pub fn append_delay(events: &mut Vec<Event>, ticks: u32) {
    if ticks == 0 {
        return;
    }
    if let Some(Event {
        kind: EventKind::Delay { ticks: last },
        ..
    }) = events.last_mut()
    {
        if let Some(sum) = last.checked_add(ticks) {
            *last = sum;
            return;
        }
    }
    events.push(Event::delay(ticks));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_delay_coalesces() {
        let mut events = vec![Event::note_off()];
        append_delay(&mut events, 10);
        append_delay(&mut events, 0);
        append_delay(&mut events, 5);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].delay_ticks(), Some(15));
    }

    #[test]
    fn test_append_delay_past_u32_starts_new_delay() {
        let mut events = vec![Event::delay(u32::MAX - 1)];
        append_delay(&mut events, 1);
        assert_eq!(events, vec![Event::delay(u32::MAX)]);
        append_delay(&mut events, 1);
        assert_eq!(events, vec![Event::delay(u32::MAX), Event::delay(1)]);
        append_delay(&mut events, 2);
        assert_eq!(events, vec![Event::delay(u32::MAX), Event::delay(3)]);
    }

    #[test]
    fn test_tempo_clone_keeps_tick_duration() {
        let mut tempo = Tempo::default();
        assert_eq!(tempo.us_per_tick(), 500_000.0 / 48.0);
        tempo.set_us_per_quarter_note(250_000);
        let copy = tempo;
        assert_eq!(copy.us_per_tick(), tempo.us_per_tick());
        assert_eq!(copy.bpm(), 240.0);
    }

    #[test]
    fn test_rhythm_role_bits() {
        assert_eq!(RhythmRole::HiHat.bit(), 0);
        assert_eq!(RhythmRole::BassDrum.bit(), 4);
    }
}
