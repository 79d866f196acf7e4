//! OPL2/OPL3 register logs to events.
//!
//! # Architecture
//!
//! - **RegisterBank**: fixed-size storage for both OPL register banks
//! - **settings**: decoding of operator/channel settings into patches
//! - **fnumber**: F-number/block to frequency conversion
//! - **OplParser**: the diff engine turning register writes into events
//!
//! # Examples
//!
//! ```rust
//! use chipseq::event::{Event, EventKind, Tempo};
//! use chipseq::opl::{self, OplRecord};
//!
//! let records = vec![
//!     OplRecord::write(0xA0, 0x44),
//!     OplRecord::write(0xB0, 0x32), // key on, block 4
//!     OplRecord::delay(20),
//!     OplRecord::write(0xB0, 0x12), // key off
//!     OplRecord::delay(20),
//! ];
//! let out = opl::parse_opl_records(&records, &Event::tempo(Tempo::default())).unwrap();
//! assert!(matches!(out.events[1].kind, EventKind::NoteOn { .. }));
//! assert!(matches!(out.events[3].kind, EventKind::NoteOff));
//! ```

pub mod entry;
pub mod fnumber;
pub mod parser;
pub mod registers;
pub mod settings;

pub use entry::{OplEntry, OplRecord};
pub use parser::{OplOutput, OplParser};
pub use registers::{KeyState, RegisterBank};

use crate::error::Result;
use crate::event::Event;

/// Convert OPL entries into events with the default parser settings.
pub fn parse_opl(entries: &[OplEntry], initial_tempo: &Event) -> Result<OplOutput> {
    OplParser::new().parse(entries, initial_tempo)
}

/// Validate loosely typed records, then parse them.
///
/// Every record is validated before any is processed, so a malformed record
/// anywhere in the list produces no output at all.
pub fn parse_opl_records(records: &[OplRecord], initial_tempo: &Event) -> Result<OplOutput> {
    let entries = records
        .iter()
        .map(OplEntry::try_from)
        .collect::<Result<Vec<_>>>()?;
    parse_opl(&entries, initial_tempo)
}
