//! Flash that the CPU can read directly from its address space.

use embedded_storage_async::nor_flash::{ErrorType, NorFlashErrorKind, ReadNorFlash};

/// Read-only view over memory-mapped (execute in place) flash.
///
/// Offsets are relative to the start of the mapped window.
pub struct MappedFlash<'a> {
    memory: &'a [u8],
}

impl<'a> MappedFlash<'a> {
    pub const fn new(memory: &'a [u8]) -> Self {
        Self { memory }
    }
}

impl MappedFlash<'static> {
    /// View `len` bytes of flash mapped at `base`.
    ///
    /// # Safety
    ///
    /// `base..base + len` must be readable memory that nothing writes to for the lifetime of the view.
    pub unsafe fn from_raw(base: *const u8, len: usize) -> Self {
        Self {
            memory: unsafe { core::slice::from_raw_parts(base, len) },
        }
    }
}

impl ErrorType for MappedFlash<'_> {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MappedFlash<'_> {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let end = start
            .checked_add(bytes.len())
            .ok_or(NorFlashErrorKind::OutOfBounds)?;
        let source = self
            .memory
            .get(start..end)
            .ok_or(NorFlashErrorKind::OutOfBounds)?;

        bytes.copy_from_slice(source);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.memory.len()
    }
}
