//! OPL register storage.
//!
//! The diff engine keeps two `RegisterBank`s: the "current" one receiving
//! every write, and the "committed" one holding the values that have
//! already been turned into events. XOR'ing them yields only the bits that
//! changed and have not been observed yet.

/// Number of addressable registers: two banks of 256 (OPL3 port 0 and 1).
pub const REGISTER_COUNT: usize = 0x200;

/// Offset of the second register bank.
pub const BANK_OFFSET: u16 = 0x100;

/// Key state for a channel or percussion voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Voice is not producing sound
    Off,
    /// Voice is producing sound
    On,
}

impl From<bool> for KeyState {
    fn from(on: bool) -> Self {
        if on { KeyState::On } else { KeyState::Off }
    }
}

/// Fixed-size register storage for both OPL banks.
///
/// Registers that were never written read as zero, matching the chip's
/// power-on state.
///
/// # Register Layout
///
/// - 0x000-0x0FF: port 0 (channels 0-8, global control)
/// - 0x100-0x1FF: port 1 (channels 9-17, OPL3 control at 0x104/0x105)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
    registers: [u8; REGISTER_COUNT],
}

impl Default for RegisterBank {
    fn default() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
        }
    }
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a value to a register.
    ///
    /// Returns `false` (and stores nothing) when `register` lies outside
    /// both banks.
    pub fn write(&mut self, register: u16, value: u8) -> bool {
        match self.registers.get_mut(register as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Read a register. Out-of-range addresses read as zero.
    pub fn read(&self, register: u16) -> u8 {
        self.registers.get(register as usize).copied().unwrap_or(0)
    }

    /// Bits that differ between `self` and `other`, per register.
    pub fn diff(&self, other: &RegisterBank) -> RegisterBank {
        let mut out = RegisterBank::default();
        for (dst, (a, b)) in out
            .registers
            .iter_mut()
            .zip(self.registers.iter().zip(other.registers.iter()))
        {
            *dst = a ^ b;
        }
        out
    }

    /// Copy a single register from `source`, marking its current value as
    /// observed.
    pub fn commit_from(&mut self, source: &RegisterBank, register: u16) {
        let value = source.read(register);
        self.write(register, value);
    }

    /// Check if no register differs from zero.
    pub fn is_clear(&self) -> bool {
        self.registers.iter().all(|&v| v == 0)
    }
}
