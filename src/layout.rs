//! Fixed flash map, shared with the tooling that flashes the images.
//!
//! ```text
//! 0                       bootloader
//! bootloader_size         slot 0: header, vector table, image
//! + slot_size             slot 1: header, vector table, image
//! + slot_size             config & reserved
//! ```

use crate::{HEADER_SIZE, Slot, boot::VectorTable};

/// Start of the memory-mapped flash window on RP2040.
pub const XIP_BASE: usize = 0x1000_0000;

/// Flash offsets of the bootloader, both slots and the vector table within a slot.
///
/// All offsets are relative to the start of flash.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    bootloader_size: u32,
    slot_size: u32,
    vector_table_offset: u32,
}

impl Layout {
    /// 2 MiB RP2040 flash: 64 KiB bootloader, two 940 KiB slots, 100 KiB config.
    pub const RP2040: Layout = Layout::new(0x01_0000, 0x0E_B800, 0x100);

    /// Describe a flash map. Inconsistent maps fail const evaluation.
    pub const fn new(bootloader_size: u32, slot_size: u32, vector_table_offset: u32) -> Self {
        assert!(
            bootloader_size.checked_add(slot_size).is_some()
                && (bootloader_size + slot_size).checked_add(slot_size).is_some(),
            "slots exceed the address space"
        );
        assert!(
            vector_table_offset as usize >= HEADER_SIZE,
            "vector table overlaps the header"
        );
        assert!(
            slot_size as usize >= size_of::<VectorTable>()
                && vector_table_offset as usize <= slot_size as usize - size_of::<VectorTable>(),
            "vector table lies outside the slot"
        );
        // VTOR ignores the low 8 bits on ARMv6-M.
        assert!(
            (bootloader_size + vector_table_offset) % 0x100 == 0 && slot_size % 0x100 == 0,
            "vector table is not 256 byte aligned"
        );

        Layout {
            bootloader_size,
            slot_size,
            vector_table_offset,
        }
    }

    pub const fn slot_size(&self) -> u32 {
        self.slot_size
    }

    pub const fn vector_table_offset(&self) -> u32 {
        self.vector_table_offset
    }

    /// Offset of the first byte of a slot, where its header lives.
    pub const fn slot_offset(&self, slot: Slot) -> u32 {
        self.bootloader_size + slot.0 as u32 * self.slot_size
    }

    /// Offset of the region past slot 1.
    pub const fn config_offset(&self) -> u32 {
        self.bootloader_size + 2 * self.slot_size
    }

    /// Address of a slot's vector table, with flash mapped at `base`.
    pub const fn vector_table(&self, base: usize, slot: Slot) -> usize {
        base + self.slot_offset(slot) as usize + self.vector_table_offset as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rp2040() {
        let layout = Layout::RP2040;

        assert_eq!(layout.slot_offset(Slot::ZERO), 0x01_0000);
        assert_eq!(layout.slot_offset(Slot::ONE), 0x0F_B800);
        assert_eq!(layout.config_offset(), 0x1E_7000);
        assert!(layout.config_offset() <= 2 * 1024 * 1024);

        assert_eq!(layout.vector_table(XIP_BASE, Slot::ZERO), 0x1001_0100);
        assert_eq!(layout.vector_table(XIP_BASE, Slot::ONE), 0x100F_B900);
    }

    #[test]
    fn slots_do_not_overlap() {
        let layout = Layout::new(0x4000, 0x2000, 0x100);

        let zero = layout.slot_offset(Slot::ZERO);
        let one = layout.slot_offset(Slot::ONE);
        assert_eq!(zero, 0x4000);
        assert_eq!(one, zero + layout.slot_size());
        assert_eq!(layout.config_offset(), one + layout.slot_size());
    }

    #[test]
    fn vector_table_is_slot_base_plus_offset() {
        let layout = Layout::new(0x1000, 0x8000, 0x200);

        for slot in Slot::ALL {
            assert_eq!(
                layout.vector_table(0x2000_0000, slot),
                0x2000_0000 + layout.slot_offset(slot) as usize + 0x200
            );
        }
    }

    #[test]
    fn vector_table_at_last_fitting_offset() {
        let layout = Layout::new(0x1000, 0x1000, 0xF00);
        assert_eq!(layout.vector_table(0, Slot::ONE), 0x2F00);
    }

    #[test]
    #[should_panic(expected = "slots exceed the address space")]
    fn slots_past_address_space() {
        Layout::new(u32::MAX - 0x10, 0x1000, 0x100);
    }

    #[test]
    #[should_panic(expected = "vector table overlaps the header")]
    fn vector_table_in_header() {
        Layout::new(0x1000, 0x1000, 0x80);
    }

    #[test]
    #[should_panic(expected = "vector table lies outside the slot")]
    fn vector_table_past_slot() {
        Layout::new(0x1000, 0x1000, 0x1000);
    }

    #[test]
    #[should_panic(expected = "vector table lies outside the slot")]
    fn vector_table_straddles_slot_end() {
        Layout::new(0x1000, 0x1000, 0xFFC);
    }

    #[test]
    #[should_panic(expected = "vector table is not 256 byte aligned")]
    fn vector_table_misaligned() {
        Layout::new(0x1080, 0x1000, 0x100);
    }

    #[test]
    #[should_panic(expected = "vector table is not 256 byte aligned")]
    fn slot_size_misaligned() {
        Layout::new(0x1000, 0x1080, 0x100);
    }
}
