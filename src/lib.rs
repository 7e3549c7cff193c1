//! Boot-time slot selection for dual-bank, execute-in-place firmware.
//!
//! Two images live at fixed flash offsets, each prefixed by a 256 byte [`FirmwareHeader`].
//! At power-on the bootloader validates both headers, picks the newest valid image and
//! hands control to it by relocating the vector table. If neither slot holds a valid image,
//! the device idles until it is reset or reflashed.
#![no_std]

use embedded_storage_async::nor_flash::NorFlashErrorKind;
use serde::{Deserialize, Serialize};

pub mod boot;
pub mod flash;
pub mod header;
pub mod layout;
pub mod select;
pub mod version;
pub mod xip;

pub use header::{FirmwareHeader, HEADER_SIZE, HeaderError, MAGIC};
pub use layout::Layout;
pub use select::{Decision, Reason, decide, run, select};
pub use version::{Version, VersionError};

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod mock;

#[cfg(feature = "defmt")]
pub(crate) use defmt as log;

#[cfg(not(feature = "defmt"))]
pub(crate) mod log {
    macro_rules! info {
        ( $fmt:literal $(, $x:expr )* $(,)? ) => {{ $( let _ = &$x; )* }};
    }
    pub(crate) use info;
    macro_rules! debug {
        ( $fmt:literal $(, $x:expr )* $(,)? ) => {{ $( let _ = &$x; )* }};
    }
    pub(crate) use debug;
    macro_rules! warner {
        ( $fmt:literal $(, $x:expr )* $(,)? ) => {{ $( let _ = &$x; )* }};
    }
    pub(crate) use warner as warn;
}

/// Failure to access the underlying flash.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// Reading a header from flash failed.
    Flash(NorFlashErrorKind),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Flash(kind) => write!(f, "flash read failed: {kind:?}"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Flash(kind) => defmt::write!(f, "Flash({})", defmt::Debug2Format(kind)),
        }
    }
}

/// Representation of a concrete device with exactly two image slots.
#[allow(async_fn_in_trait)]
pub trait Device {
    /// Read the header at the start of an image slot.
    async fn read_header(&mut self, slot: Slot) -> Result<FirmwareHeader, Error>;

    /// Boot a specific image slot. Never returns.
    fn boot(self, slot: Slot) -> !;

    /// Give up: no slot is bootable. Never returns.
    fn halt(self) -> !;
}

/// Image slot with regards to the bootloader.
///
/// There are exactly two: [`Slot::ZERO`] and [`Slot::ONE`].
/// Layout describes at what flash offset each slot resides.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(pub(crate) u8);

impl Slot {
    pub const ZERO: Slot = Slot(0);
    pub const ONE: Slot = Slot(1);

    /// Both slots, in order of preference on a tie.
    pub const ALL: [Slot; 2] = [Slot::ZERO, Slot::ONE];

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Slot numbers other than 0 and 1 do not exist.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NoSuchSlot(pub u8);

impl core::fmt::Display for NoSuchSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "no such slot: {}", self.0)
    }
}

impl core::error::Error for NoSuchSlot {}

impl TryFrom<u8> for Slot {
    type Error = NoSuchSlot;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Slot::ZERO),
            1 => Ok(Slot::ONE),
            n => Err(NoSuchSlot(n)),
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_from_u8() {
        assert_eq!(Slot::try_from(0), Ok(Slot::ZERO));
        assert_eq!(Slot::try_from(1), Ok(Slot::ONE));
        assert_eq!(Slot::try_from(2), Err(NoSuchSlot(2)));
        assert_eq!(Slot::try_from(0xff), Err(NoSuchSlot(0xff)));

        assert_eq!(u8::from(Slot::ONE), 1);
        assert_eq!(Slot::ONE.index(), 1);
    }
}
