//! Register-state diff engine.
//!
//! Register writes are accumulated without producing anything until a delay
//! makes them audible. At that point the accumulated state is compared with
//! the state already turned into events, and only the differences are
//! translated: configuration toggles first, then key-on edges for every
//! voice in fixed channel order.
//!
//! Only the registers that carry an emitted change are committed. The rest
//! of a channel's instrument registers stay pending until the channel is
//! keyed on again, at which point they are read as the note's patch.

use super::entry::OplEntry;
use super::fnumber::{self, OPL_CONVERSION_FACTOR};
use super::registers::{KeyState, RegisterBank};
use super::settings::{self, SLOTS_2OP, SLOTS_4OP, SLOTS_CARRIER, SLOTS_MODULATOR, SlotMask};
use crate::error::{Error, Result};
use crate::event::{ConfigOption, Event, Origin, RhythmRole};
use crate::patch::{Patch, PatchRegistry};

/// Wave-select enable: register 0x01 bit 5.
const REG_WAVESEL: u16 = 0x01;
/// Rhythm mode and percussion key-on bits.
const REG_RHYTHM: u16 = 0xBD;
/// Per-channel-pair 4-operator enable bits (OPL3).
const REG_FOUR_OP: u16 = 0x104;
/// OPL3 mode enable: register 0x105 bit 0.
const REG_OPL3: u16 = 0x105;

/// Maximum output attenuation of an operator.
const MAX_ATTENUATION: u8 = 63;

/// A key-on source: a melodic channel or one percussion role.
#[derive(Debug, Clone, Copy)]
struct Voice {
    channel: u8,
    slots: SlotMask,
    rhythm: Option<RhythmRole>,
}

impl Voice {
    fn melodic(channel: u8, slots: SlotMask) -> Self {
        Self {
            channel,
            slots,
            rhythm: None,
        }
    }

    fn percussion(channel: u8, slots: SlotMask, role: RhythmRole) -> Self {
        Self {
            channel,
            slots,
            rhythm: Some(role),
        }
    }

    /// Register holding this voice's key-on bit, and the bit mask.
    fn key_register(&self) -> (u16, u8) {
        match self.rhythm {
            Some(role) => (REG_RHYTHM, 1 << role.bit()),
            None => (
                0xB0 + (self.channel % 9) as u16 + settings::bank_offset(self.channel),
                0x20,
            ),
        }
    }

    fn origin(&self) -> Origin {
        Origin::Opl {
            channel: self.channel,
            rhythm: self.rhythm,
        }
    }
}

/// Result of a diff run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OplOutput {
    pub events: Vec<Event>,
    pub patches: PatchRegistry,
}

/// Converts OPL register logs into events.
///
/// # Examples
///
/// ```
/// use chipseq::event::{Event, Tempo};
/// use chipseq::opl::{OplEntry, OplParser};
///
/// let entries = [
///     OplEntry::Write { reg: 0xA0, val: 0x44 },
///     OplEntry::Write { reg: 0xB0, val: 0x32 },
///     OplEntry::Delay(10),
/// ];
/// let out = OplParser::new()
///     .parse(&entries, &Event::tempo(Tempo::default()))
///     .unwrap();
/// // tempo, note on, delay
/// assert_eq!(out.events.len(), 3);
/// assert_eq!(out.patches.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct OplParser {
    conversion_factor: f64,
}

impl Default for OplParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OplParser {
    /// Create a parser using the standard OPL sample rate (49716 Hz) for
    /// frequency conversion.
    pub fn new() -> Self {
        Self {
            conversion_factor: OPL_CONVERSION_FACTOR,
        }
    }

    /// Use a different F-number conversion factor, for chips clocked away
    /// from the standard 14.31818 MHz. The factor must be finite and
    /// positive; otherwise [`parse`](Self::parse) fails with
    /// `InvalidArgument`.
    pub fn with_conversion_factor(mut self, conversion_factor: f64) -> Self {
        self.conversion_factor = conversion_factor;
        self
    }

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor
    }

    /// Convert `entries` into events, starting with `initial_tempo`.
    ///
    /// `initial_tempo` must be a tempo event; it becomes the first output
    /// event.
    pub fn parse(&self, entries: &[OplEntry], initial_tempo: &Event) -> Result<OplOutput> {
        if !self.conversion_factor.is_finite() || self.conversion_factor <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "conversion factor must be finite and positive, got {}",
                self.conversion_factor
            )));
        }
        if initial_tempo.as_tempo().is_none() {
            return Err(Error::InvalidArgument(
                "initial tempo must be a tempo event".into(),
            ));
        }

        let mut diff = DiffState::new(self.conversion_factor);
        diff.events.push(initial_tempo.clone());

        for entry in entries {
            match *entry {
                OplEntry::Write { reg, val } => {
                    // Later writes replace earlier ones; with no delay in
                    // between the earlier value was never audible.
                    if !diff.current.write(reg, val) {
                        log::debug!("ignoring write to register 0x{:X}", reg);
                    }
                }
                OplEntry::Tempo(tempo) => diff.set_tempo(Event::tempo(tempo)),
                OplEntry::Delay(0) => {}
                OplEntry::Delay(ticks) => {
                    diff.flush()?;
                    crate::event::append_delay(&mut diff.events, ticks);
                }
            }
        }

        // Pending edges with no trailing delay.
        diff.flush()?;

        log::debug!(
            "OPL parse produced {} events, {} patches",
            diff.events.len(),
            diff.patches.len()
        );

        Ok(OplOutput {
            events: diff.events,
            patches: diff.patches,
        })
    }
}

/// Mutable state of one parse call.
struct DiffState {
    current: RegisterBank,
    committed: RegisterBank,
    events: Vec<Event>,
    patches: PatchRegistry,
    conversion_factor: f64,
}

impl DiffState {
    fn new(conversion_factor: f64) -> Self {
        Self {
            current: RegisterBank::new(),
            committed: RegisterBank::new(),
            events: Vec::new(),
            patches: PatchRegistry::new(),
            conversion_factor,
        }
    }

    /// Append a tempo change, replacing a tempo change that has not been
    /// followed by anything yet.
    fn set_tempo(&mut self, tempo: Event) {
        if self.events.last().and_then(Event::as_tempo).is_some() {
            self.events.pop();
        }
        self.events.push(tempo);
    }

    /// Translate all unobserved register changes into events.
    fn flush(&mut self) -> Result<()> {
        let diff = self.current.diff(&self.committed);
        let before = self.events.len();

        self.check_config(&diff, REG_WAVESEL, 0x20, ConfigOption::EnableWaveSel);
        self.check_config(&diff, REG_OPL3, 0x01, ConfigOption::EnableOpl3);

        for voice in self.voices() {
            self.check_voice(&diff, voice)?;
        }

        log::trace!("flush produced {} events", self.events.len() - before);
        Ok(())
    }

    fn check_config(&mut self, diff: &RegisterBank, reg: u16, mask: u8, option: ConfigOption) {
        let changed = diff.read(reg);
        if changed == 0 {
            return;
        }
        if changed & mask != 0 {
            let value = self.current.read(reg) & mask != 0;
            self.events.push(Event::configuration(option, value));
        }
        self.committed.commit_from(&self.current, reg);
    }

    /// Every key-on source in evaluation order.
    fn voices(&self) -> Vec<Voice> {
        let rhythm_on = self.current.read(REG_RHYTHM) & 0x20 != 0;
        let opl3 = self.current.read(REG_OPL3) & 0x01 != 0;
        let four_op = self.current.read(REG_FOUR_OP);
        let channels = if opl3 { 18 } else { 9 };

        let mut voices = Vec::with_capacity(channels + 2);
        for c in 0..channels as u8 {
            let four_op_bit = match c {
                0..=2 => Some(c),
                9..=11 => Some(c - 9 + 3),
                _ => None,
            };
            if four_op_bit.is_some_and(|bit| four_op & (1 << bit) != 0) {
                voices.push(Voice::melodic(c, SLOTS_4OP));
                continue;
            }
            match c {
                6 if rhythm_on => {
                    voices.push(Voice::percussion(c, SLOTS_2OP, RhythmRole::BassDrum));
                }
                7 if rhythm_on => {
                    voices.push(Voice::percussion(c, SLOTS_MODULATOR, RhythmRole::HiHat));
                    voices.push(Voice::percussion(c, SLOTS_CARRIER, RhythmRole::SnareDrum));
                }
                8 if rhythm_on => {
                    voices.push(Voice::percussion(c, SLOTS_MODULATOR, RhythmRole::TomTom));
                    voices.push(Voice::percussion(c, SLOTS_CARRIER, RhythmRole::TopCymbal));
                }
                _ => voices.push(Voice::melodic(c, SLOTS_2OP)),
            }
        }
        voices
    }

    /// Emit a note on/off if the voice's key-on bit changed.
    fn check_voice(&mut self, diff: &RegisterBank, voice: Voice) -> Result<()> {
        let (reg, mask) = voice.key_register();
        if diff.read(reg) & mask == 0 {
            return Ok(());
        }

        let key_state = KeyState::from(self.current.read(reg) & mask != 0);
        let event = match key_state {
            KeyState::Off => Event::note_off(),
            KeyState::On => self.note_on(&voice)?,
        };
        self.events.push(event.with_origin(voice.origin()));
        self.committed.commit_from(&self.current, reg);
        Ok(())
    }

    fn note_on(&mut self, voice: &Voice) -> Result<Event> {
        let settings = settings::channel_settings(&self.current, voice.channel, voice.slots);
        let instrument = self.patches.find_or_insert(Patch::Opl(settings.patch));

        let frequency =
            fnumber::fnum_to_frequency(settings.fnum, settings.block, self.conversion_factor)?;

        let output_level = settings
            .patch
            .carrier()
            .map(|op| op.output_level)
            .unwrap_or(0);
        let velocity =
            settings::log_volume_to_lin_velocity(MAX_ATTENUATION - output_level, MAX_ATTENUATION);

        Ok(Event::note_on(frequency, velocity, instrument))
    }
}
