#![no_std]
#![no_main]

use cortex_m_rt::entry;
use twinboot::FirmwareHeader;

use {defmt_rtt as _, panic_halt as _};

#[unsafe(link_section = ".firmware_header")]
#[used]
pub static FIRMWARE_HEADER: FirmwareHeader =
    FirmwareHeader::new(true, "250720", "v1.1.30-11-dswddf", 0, 1);

#[entry]
fn main() -> ! {
    defmt::info!(
        "=== Hello from {=[u8]:a} ===",
        FIRMWARE_HEADER.version_text()
    );

    loop {
        cortex_m::asm::wfi();
    }
}
