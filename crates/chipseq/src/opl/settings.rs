//! Decoding of per-channel instrument settings from OPL registers.

use super::registers::{BANK_OFFSET, RegisterBank};
use crate::patch::{OplOperator, OplPatch};

/// Operator offset of each chip-local channel's modulator. The carrier is
/// three operators further on.
const MODULATOR_OFFSETS: [u16; 9] = [0x00, 0x01, 0x02, 0x08, 0x09, 0x0A, 0x10, 0x11, 0x12];

/// Which of a voice's four operator slots are in use.
pub type SlotMask = [bool; 4];

/// Two-operator melodic voice.
pub const SLOTS_2OP: SlotMask = [true, true, false, false];
/// Four-operator melodic voice.
pub const SLOTS_4OP: SlotMask = [true, true, true, true];
/// Percussion voice using only the channel's modulator.
pub const SLOTS_MODULATOR: SlotMask = [true, false, false, false];
/// Percussion voice using only the channel's carrier.
pub const SLOTS_CARRIER: SlotMask = [false, true, false, false];

/// Settings of one channel at the moment a note starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSettings {
    pub patch: OplPatch,
    pub fnum: u16,
    pub block: u8,
}

/// Register offset of bank `channel / 9`.
pub fn bank_offset(channel: u8) -> u16 {
    BANK_OFFSET * (channel / 9) as u16
}

/// Register offset of operator `slot` of `channel` (0-17), including the
/// bank offset.
///
/// Slots 0/1 are the channel's modulator and carrier, slots 2/3 are the
/// modulator and carrier of channel+3, which a 4-operator voice borrows.
pub fn operator_offset(channel: u8, slot: usize) -> u16 {
    let local = (channel % 9) as usize;
    let pair = if slot >= 2 { local + 3 } else { local };
    let base = MODULATOR_OFFSETS[pair % 9];
    let op = if slot % 2 == 1 { base + 3 } else { base };
    bank_offset(channel) + op
}

/// Decode the operator at `offset` (as returned by [`operator_offset`]).
pub fn read_operator(regs: &RegisterBank, offset: u16) -> OplOperator {
    let r20 = regs.read(0x20 + offset);
    let r40 = regs.read(0x40 + offset);
    let r60 = regs.read(0x60 + offset);
    let r80 = regs.read(0x80 + offset);
    let re0 = regs.read(0xE0 + offset);

    OplOperator {
        enable_tremolo: r20 & 0x80 != 0,
        enable_vibrato: r20 & 0x40 != 0,
        enable_sustain: r20 & 0x20 != 0,
        enable_ksr: r20 & 0x10 != 0,
        freq_mult: r20 & 0x0F,
        scale_level: r40 >> 6,
        output_level: r40 & 0x3F,
        attack_rate: r60 >> 4,
        decay_rate: r60 & 0x0F,
        sustain_level: r80 >> 4,
        release_rate: r80 & 0x0F,
        wave_select: re0 & 0x07,
    }
}

/// Read the instrument and pitch of `channel` (0-17) for the operators
/// selected by `slots`.
///
/// Register layout:
/// - 0xA0-0xA8: F-Number low 8 bits
/// - 0xB0-0xB8: Key On (bit 5) + Block (bits 4-2) + F-Number high 2 bits (bits 1-0)
/// - 0xC0-0xC8: Feedback (bits 3-1) + Connection (bit 0)
pub fn channel_settings(regs: &RegisterBank, channel: u8, slots: SlotMask) -> ChannelSettings {
    let chip = bank_offset(channel);
    let local = (channel % 9) as u16;

    let mut patch = OplPatch::default();
    for (i, used) in slots.iter().enumerate() {
        if *used {
            patch.slots[i] = Some(read_operator(regs, operator_offset(channel, i)));
        }
    }

    let c0 = regs.read(0xC0 + local + chip);
    patch.feedback = (c0 >> 1) & 0x07;
    patch.connection = c0 & 0x01;
    if slots[2] || slots[3] {
        let c0_pair = regs.read(0xC0 + local + 3 + chip);
        patch.connection |= (c0_pair & 0x01) << 1;
    }

    let fnum_low = regs.read(0xA0 + local + chip) as u16;
    let block_fnum_high = regs.read(0xB0 + local + chip);

    ChannelSettings {
        patch,
        fnum: fnum_low | ((block_fnum_high & 0x03) as u16) << 8,
        block: (block_fnum_high >> 2) & 0x07,
    }
}

/// Convert a logarithmic volume (`0..=max`, where `max` is loudest) into a
/// perceptually linear velocity in `[0, 1]`.
pub fn log_volume_to_lin_velocity(volume: u8, max: u8) -> f64 {
    let range = max as f64 + 1.0;
    let remaining = (range - volume.min(max) as f64).max(1.0);
    1.0 - remaining.ln() / range.ln()
}

/// Inverse of [`log_volume_to_lin_velocity`].
pub fn lin_velocity_to_log_volume(velocity: f64, max: u8) -> u8 {
    let range = max as f64 + 1.0;
    let v = velocity.clamp(0.0, 1.0);
    let volume = range - range.powf(1.0 - v);
    volume.round().clamp(0.0, max as f64) as u8
}
