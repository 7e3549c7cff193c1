#![no_std]
#![no_main]

use cortex_m_rt::entry;
use twinboot::{
    Layout, boot::cortex_m::SimpleCortexM, flash::MappedFlash, layout::XIP_BASE, xip::Xip,
};

use {defmt_rtt as _, panic_halt as _};

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

const FLASH_SIZE: usize = 2 * 1024 * 1024;

#[entry]
fn main() -> ! {
    defmt::info!("=== Bootloader started ===");

    let flash = unsafe { MappedFlash::from_raw(XIP_BASE as *const u8, FLASH_SIZE) };
    let device: Xip<_, SimpleCortexM> = Xip::new(flash, Layout::RP2040, XIP_BASE);

    embassy_futures::block_on(twinboot::run(device))
}
