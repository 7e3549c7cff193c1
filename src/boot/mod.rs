#[cfg(feature = "cortex_m")]
pub mod cortex_m;

/// First two words of a Cortex-M vector table.
///
/// Only these are consumed when handing over control, the remainder belongs to the image.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VectorTable {
    pub initial_stack_pointer: u32,
    pub reset_handler: u32,
}

/// Bootload mechanism that relocates the vector table to an image slot and jumps into it.
pub trait Boot {
    /// Point the vector table base at `vector_table`, load the stack pointer from its first word
    /// and branch to the reset handler in its second word.
    ///
    /// # Safety
    ///
    /// `vector_table` must address a well-formed vector table of an image that can run from where it is.
    /// Nothing verifies this.
    unsafe fn boot(vector_table: *const u32) -> !;

    /// Idle forever, used when no image can be booted.
    fn halt() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
