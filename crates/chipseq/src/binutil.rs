//! Fixed-width integer codecs for meta-event payloads.

/// Failure of a byte-level read or write.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The payload is shorter than `offset + needed` bytes.
    #[error("payload too short: {needed} bytes at offset {offset}, have {available}")]
    OffsetOutOfRange {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A value does not fit the width it is being encoded into.
    #[error("value 0x{value:X} does not fit in {bits} bits")]
    ValueTooWide { value: u32, bits: u32 },
}

/// Decode three big-endian bytes starting at `off`.
pub fn read_u24_be_at(bytes: &[u8], off: usize) -> Result<u32, ParseError> {
    let field = bytes
        .get(off..off.saturating_add(3))
        .ok_or(ParseError::OffsetOutOfRange {
            offset: off,
            needed: 3,
            available: bytes.len(),
        })?;
    Ok(field
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
}

/// Encode `v` as three big-endian bytes.
///
/// Fails with `ParseError::ValueTooWide` when `v` needs more than 24 bits.
pub fn write_u24_be(v: u32) -> Result<[u8; 3], ParseError> {
    if v > 0x00FF_FFFF {
        return Err(ParseError::ValueTooWide { value: v, bits: 24 });
    }
    let [_, hi, mid, lo] = v.to_be_bytes();
    Ok([hi, mid, lo])
}
