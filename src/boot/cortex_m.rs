use cortex_m::peripheral::SCB;

use crate::boot::Boot;

/// Bootload mechanism for Cortex-M cores with a relocatable vector table, without TrustZone.
pub struct SimpleCortexM;

impl Boot for SimpleCortexM {
    #[inline(never)]
    unsafe fn boot(vector_table: *const u32) -> ! {
        unsafe {
            (*SCB::PTR).vtor.write(vector_table as u32);

            cortex_m::asm::dsb();
            cortex_m::asm::isb();

            // Loads MSP from the first word and branches to the second without touching the stack in between.
            cortex_m::asm::bootload(vector_table)
        }
    }

    fn halt() -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}
