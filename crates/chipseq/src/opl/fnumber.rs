//! F-number utilities for OPL frequency computations.
//!
//! The OPL family encodes pitch as a 10-bit F-number plus a 3-bit block
//! (octave). The produced frequency is
//!
//! ```text
//! f = fnum × factor × 2^(block − 20)
//! ```
//!
//! where `factor` is the chip's sample rate: the master clock divided by
//! 288 (14.31818 MHz / 288 ≈ 49716 Hz).
//!
//! # Examples
//!
//! ```rust
//! use chipseq::opl::fnumber::{fnum_to_frequency, frequency_to_fnum, OPL_CONVERSION_FACTOR};
//!
//! let freq = fnum_to_frequency(0x244, 4, OPL_CONVERSION_FACTOR).unwrap();
//! assert!((freq - 440.0).abs() < 1.0);
//!
//! let fnum = frequency_to_fnum(440.0, OPL_CONVERSION_FACTOR).unwrap();
//! assert_eq!(fnum.block, 4);
//! ```

/// OPL sample rate in Hz, used as the default conversion factor.
pub const OPL_CONVERSION_FACTOR: f64 = 49716.0;

/// Largest F-number value (10 bits).
pub const FNUM_MAX: u16 = 0x3FF;

/// Largest block value (3 bits).
pub const BLOCK_MAX: u8 = 7;

/// Representation of an F-number for a chip.
///
/// Fields:
/// - `fnum`: 10-bit F-number.
/// - `block`: block (octave indicator).
/// - `actual_freq_hz`: frequency produced by this `(block, fnum)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FNumber {
    pub fnum: u16,
    pub block: u8,
    pub actual_freq_hz: f64,
}

/// Error enum used by F-number utilities.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FNumberError {
    #[error("invalid input")]
    InvalidInput,
    #[error("{param} value {value} exceeds its {bits}-bit field")]
    ExcessiveBits {
        param: &'static str,
        value: u32,
        bits: u32,
    },
    #[error("frequency {0} Hz cannot be produced by any block")]
    OutOfRange(f64),
}

fn check_factor(conversion_factor: f64) -> Result<(), FNumberError> {
    if !conversion_factor.is_finite() || conversion_factor <= 0.0 {
        return Err(FNumberError::InvalidInput);
    }
    Ok(())
}

/// Compute the produced frequency (Hz) for `fnum` and `block`.
pub fn fnum_to_frequency(fnum: u16, block: u8, conversion_factor: f64) -> Result<f64, FNumberError> {
    check_factor(conversion_factor)?;
    if fnum > FNUM_MAX {
        return Err(FNumberError::ExcessiveBits {
            param: "fnum",
            value: fnum as u32,
            bits: 10,
        });
    }
    if block > BLOCK_MAX {
        return Err(FNumberError::ExcessiveBits {
            param: "block",
            value: block as u32,
            bits: 3,
        });
    }
    Ok(fnum as f64 * conversion_factor * 2_f64.powi(block as i32 - 20))
}

/// Find the `(block, fnum)` pair closest to `freq`.
///
/// The lowest block whose F-number range can hold the frequency is chosen,
/// since it gives the finest pitch resolution.
pub fn frequency_to_fnum(freq: f64, conversion_factor: f64) -> Result<FNumber, FNumberError> {
    check_factor(conversion_factor)?;
    if !freq.is_finite() || freq <= 0.0 {
        return Err(FNumberError::InvalidInput);
    }

    for block in 0..=BLOCK_MAX {
        let ideal = freq / (conversion_factor * 2_f64.powi(block as i32 - 20));
        let fnum = ideal.round();
        if fnum <= FNUM_MAX as f64 {
            let fnum = fnum as u16;
            let actual_freq_hz = fnum_to_frequency(fnum, block, conversion_factor)?;
            return Ok(FNumber {
                fnum,
                block,
                actual_freq_hz,
            });
        }
    }

    Err(FNumberError::OutOfRange(freq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_doubles_frequency() {
        let f4 = fnum_to_frequency(0x200, 4, OPL_CONVERSION_FACTOR).unwrap();
        let f5 = fnum_to_frequency(0x200, 5, OPL_CONVERSION_FACTOR).unwrap();
        assert!((f5 - 2.0 * f4).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            fnum_to_frequency(0x400, 0, OPL_CONVERSION_FACTOR),
            Err(FNumberError::ExcessiveBits { param: "fnum", .. })
        ));
        assert!(matches!(
            fnum_to_frequency(0x100, 8, OPL_CONVERSION_FACTOR),
            Err(FNumberError::ExcessiveBits { param: "block", .. })
        ));
        assert_eq!(
            fnum_to_frequency(0x100, 0, 0.0),
            Err(FNumberError::InvalidInput)
        );
        assert_eq!(
            frequency_to_fnum(-1.0, OPL_CONVERSION_FACTOR),
            Err(FNumberError::InvalidInput)
        );
    }

    #[test]
    fn test_too_high_frequency() {
        assert!(matches!(
            frequency_to_fnum(100_000.0, OPL_CONVERSION_FACTOR),
            Err(FNumberError::OutOfRange(_))
        ));
    }
}
