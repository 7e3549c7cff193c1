//! Device for images that eXecute In Place from memory-mapped flash.

use core::marker::PhantomData;

use embedded_storage_async::nor_flash::{NorFlashError, ReadNorFlash};
use zerocopy::{FromZeros, IntoBytes};

use crate::{Device, Error, FirmwareHeader, Layout, Slot, boot::Boot};

/// Device whose slots are executed in place.
///
/// Nothing is copied around: headers are read through `flash` and booting jumps directly
/// to the vector table of the chosen slot as seen through the mapped window at `base`.
/// Both must describe the same physical flash.
///
/// Good to note is that the image is not verified beyond its header.
pub struct Xip<F, B> {
    flash: F,
    layout: Layout,
    base: usize,
    boot: PhantomData<B>,
}

impl<F: ReadNorFlash, B: Boot> Xip<F, B> {
    pub fn new(flash: F, layout: Layout, base: usize) -> Self {
        Self {
            flash,
            layout,
            base,
            boot: PhantomData,
        }
    }
}

impl<F: ReadNorFlash, B: Boot> Device for Xip<F, B> {
    async fn read_header(&mut self, slot: Slot) -> Result<FirmwareHeader, Error> {
        let mut header = FirmwareHeader::new_zeroed();
        self.flash
            .read(self.layout.slot_offset(slot), header.as_mut_bytes())
            .await
            .map_err(|e| Error::Flash(e.kind()))?;
        Ok(header)
    }

    fn boot(self, slot: Slot) -> ! {
        let vector_table = self.layout.vector_table(self.base, slot);
        unsafe { B::boot(core::ptr::with_exposed_provenance(vector_table)) }
    }

    fn halt(self) -> ! {
        B::halt()
    }
}
