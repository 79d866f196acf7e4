//! Instrument descriptors and the registry that deduplicates them.

use serde::{Deserialize, Serialize};

/// General MIDI instrument selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MidiPatch {
    pub bank: u16,
    pub program: u8,
}

/// Settings of a single OPL operator, decoded from registers
/// 0x20, 0x40, 0x60, 0x80 and 0xE0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OplOperator {
    pub enable_tremolo: bool,
    pub enable_vibrato: bool,
    pub enable_sustain: bool,
    pub enable_ksr: bool,
    pub freq_mult: u8,
    pub scale_level: u8,
    /// Attenuation, 0 (loudest) to 63 (silent).
    pub output_level: u8,
    pub attack_rate: u8,
    pub decay_rate: u8,
    pub sustain_level: u8,
    pub release_rate: u8,
    pub wave_select: u8,
}

/// OPL voice: up to four operators plus channel-level feedback and
/// connection.
///
/// Slots 0/1 are the channel's modulator/carrier. Slots 2/3 are only used
/// by 4-operator voices. Percussion voices leave unused slots empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OplPatch {
    pub slots: [Option<OplOperator>; 4],
    pub feedback: u8,
    /// Bit 0: connection of the first operator pair; bit 1: of the second
    /// pair (4-operator voices only).
    pub connection: u8,
}

impl OplPatch {
    /// Operator whose output level sets the audible volume.
    pub fn carrier(&self) -> Option<&OplOperator> {
        self.slots[1].as_ref().or(self.slots[0].as_ref())
    }
}

/// Structural instrument descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Patch {
    Midi(MidiPatch),
    Opl(OplPatch),
}

/// Ordered, deduplicated list of patches.
///
/// A patch's index is its identity: indices are assigned in first-seen
/// order and never change. Lookup is a linear scan over structural
/// equality, which keeps index assignment deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchRegistry {
    patches: Vec<Patch>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first patch structurally equal to `patch`, if any.
    pub fn find(&self, patch: &Patch) -> Option<usize> {
        self.patches.iter().position(|p| p == patch)
    }

    /// Index of `patch`, appending it first if it has not been seen.
    pub fn find_or_insert(&mut self, patch: Patch) -> usize {
        if let Some(idx) = self.find(&patch) {
            return idx;
        }
        self.patches.push(patch);
        let idx = self.patches.len() - 1;
        log::debug!("new patch #{}: {:?}", idx, patch);
        idx
    }

    pub fn get(&self, index: usize) -> Option<&Patch> {
        self.patches.get(index)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
        self.patches.iter()
    }

    pub fn into_vec(self) -> Vec<Patch> {
        self.patches
    }
}

impl<'a> IntoIterator for &'a PatchRegistry {
    type Item = &'a Patch;
    type IntoIter = std::slice::Iter<'a, Patch>;

    fn into_iter(self) -> Self::IntoIter {
        self.patches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midi(program: u8) -> Patch {
        Patch::Midi(MidiPatch { bank: 0, program })
    }

    #[test]
    fn test_find_or_insert_dedups() {
        let mut reg = PatchRegistry::new();
        assert_eq!(reg.find_or_insert(midi(5)), 0);
        assert_eq!(reg.find_or_insert(midi(7)), 1);
        assert_eq!(reg.find_or_insert(midi(5)), 0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_opl_patch_identity_is_structural() {
        let mut reg = PatchRegistry::new();
        let mut op = OplOperator {
            output_level: 10,
            ..Default::default()
        };
        let a = Patch::Opl(OplPatch {
            slots: [Some(op), Some(op), None, None],
            feedback: 3,
            connection: 0,
        });
        assert_eq!(reg.find_or_insert(a), 0);
        assert_eq!(reg.find_or_insert(a), 0);

        op.wave_select = 1;
        let b = Patch::Opl(OplPatch {
            slots: [Some(op), Some(op), None, None],
            feedback: 3,
            connection: 0,
        });
        assert_eq!(reg.find_or_insert(b), reg.len() - 1);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_carrier_falls_back_to_first_slot() {
        let op = OplOperator {
            output_level: 7,
            ..Default::default()
        };
        let p = OplPatch {
            slots: [Some(op), None, None, None],
            ..Default::default()
        };
        assert_eq!(p.carrier().map(|o| o.output_level), Some(7));
    }
}
