#![doc = include_str!("../README.md")]
//! chipseq: musical event timelines from sound-chip register writes and MIDI
//!
//! The crate turns two kinds of low-level control stream into one shared
//! vocabulary of [`event::Event`]s:
//!
//! - [`opl`]: a register-state diff engine for Yamaha OPL2/OPL3 write logs.
//!   It keeps a shadow of the chip's registers and, at every delay, reports
//!   only the audible changes: note-ons with frequency, velocity and a
//!   deduplicated instrument patch, note-offs, and configuration toggles.
//! - [`midi`]: an interpreter for decoded MIDI channel and meta messages
//!   that gives every sounding note its own voice slot.
//!
//! The resulting flat stream can be split into monophonic per-channel
//! [`track::Track`]s for editing, and merged back into one stream for
//! playback or export (see [`track`]).
//!
//! Example: OPL writes to tracks and back
//!
//! ```rust
//! use chipseq::event::{Event, EventKind, Tempo};
//! use chipseq::opl::{self, OplEntry};
//! use chipseq::track;
//!
//! let entries = [
//!     // Channel 0: carrier at full volume, F-number 0x244 block 4, key on.
//!     OplEntry::Write { reg: 0x43, val: 0x00 },
//!     OplEntry::Write { reg: 0xA0, val: 0x44 },
//!     OplEntry::Write { reg: 0xB0, val: 0x32 },
//!     OplEntry::Delay(24),
//!     // Key off.
//!     OplEntry::Write { reg: 0xB0, val: 0x12 },
//!     OplEntry::Delay(24),
//! ];
//! let out = opl::parse_opl(&entries, &Event::tempo(Tempo::default())).unwrap();
//! assert!(matches!(out.events[0].kind, EventKind::Tempo(_)));
//! assert!(matches!(out.events[1].kind, EventKind::NoteOn { .. }));
//! assert_eq!(out.patches.len(), 1);
//!
//! let split = track::split(&out.events, track::opl_channel_assignment);
//! let mut merged = Vec::new();
//! track::merge(&mut merged, &split.pattern.tracks);
//! assert_eq!(merged, out.events);
//! ```

mod binutil;
pub mod error;
pub mod event;
pub mod midi;
pub mod opl;
pub mod patch;
pub mod track;

pub use binutil::ParseError;
pub use error::{Error, Result};
pub use event::{Event, EventKind, Tempo};
pub use patch::{Patch, PatchRegistry};
