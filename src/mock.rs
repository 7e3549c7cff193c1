use std::{cell::Cell, vec, vec::Vec};

use embedded_storage_async::nor_flash::NorFlashErrorKind;
use zerocopy::IntoBytes;

use crate::{
    Device, Error, FirmwareHeader, Layout, Slot,
    boot::{Boot, VectorTable},
};

/// Header flagged valid with the given version text.
pub fn valid(version: &str) -> FirmwareHeader {
    FirmwareHeader::new(true, "2025-07-16 13:30", version, 23252, 0)
}

/// Header carrying a version but not flagged valid.
pub fn unflagged(version: &str) -> FirmwareHeader {
    FirmwareHeader::new(false, "2025-07-16 13:30", version, 23252, 0)
}

/// Valid header with one magic byte flipped.
pub fn bad_magic(version: &str) -> FirmwareHeader {
    let mut header = valid(version);
    header.magic[4] = b'-';
    header
}

/// Device holding two headers in memory. `None` makes reading that header fail.
pub struct MockDevice {
    pub headers: [Option<FirmwareHeader>; 2],
}

impl MockDevice {
    pub fn new(slot0: FirmwareHeader, slot1: FirmwareHeader) -> MockDevice {
        MockDevice {
            headers: [Some(slot0), Some(slot1)],
        }
    }
}

impl Device for MockDevice {
    async fn read_header(&mut self, slot: Slot) -> Result<FirmwareHeader, Error> {
        self.headers[slot.index()]
            .clone()
            .ok_or(Error::Flash(NorFlashErrorKind::Other))
    }

    fn boot(self, slot: Slot) -> ! {
        panic!("boot into slot {}", slot.0)
    }

    fn halt(self) -> ! {
        panic!("halted")
    }
}

/// What [`RecordingBoot`] would have done.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Jump {
    pub vector_table: usize,
    pub loaded: VectorTable,
}

std::thread_local! {
    static LAST_JUMP: Cell<Option<Jump>> = const { Cell::new(None) };
}

/// Records the vector table address and the two words a real jump would load, then panics.
pub struct RecordingBoot;

impl RecordingBoot {
    pub fn take() -> Option<Jump> {
        LAST_JUMP.with(Cell::take)
    }
}

impl Boot for RecordingBoot {
    unsafe fn boot(vector_table: *const u32) -> ! {
        let loaded = unsafe { vector_table.cast::<VectorTable>().read_unaligned() };
        LAST_JUMP.with(|jump| {
            jump.set(Some(Jump {
                vector_table: vector_table as usize,
                loaded,
            }))
        });
        panic!("booted")
    }

    fn halt() -> ! {
        panic!("halted")
    }
}

/// Erased flash with headers and vector tables written into slots.
pub struct FlashImage {
    layout: Layout,
    memory: Vec<u8>,
}

impl FlashImage {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            memory: vec![0xff; layout.config_offset() as usize],
        }
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) {
        let offset = offset as usize;
        self.memory[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn header(mut self, slot: Slot, header: &FirmwareHeader) -> Self {
        self.write(self.layout.slot_offset(slot), header.as_bytes());
        self
    }

    pub fn vector_table(mut self, slot: Slot, table: VectorTable) -> Self {
        let offset = self.layout.slot_offset(slot) + self.layout.vector_table_offset();
        self.write(offset, &table.initial_stack_pointer.to_le_bytes());
        self.write(offset + 4, &table.reset_handler.to_le_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.memory
    }
}
