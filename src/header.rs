//! Fixed-layout metadata at the start of every image slot.
//!
//! The layout is shared with the tooling that builds and flashes images and must stay bit-exact:
//!
//! | offset | size | field           |
//! |--------|------|-----------------|
//! | 0      | 13   | `magic`         |
//! | 13     | 1    | `valid_flag`    |
//! | 14     | 16   | `build_date`    |
//! | 30     | 32   | `version`       |
//! | 62     | 4    | `firmware_size` |
//! | 66     | 1    | `slot`          |
//! | 67     | 4    | `crc32`         |
//! | 71     | 185  | `reserved`      |
//!
//! Multi-byte integers are little endian.

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::{LittleEndian, U32},
};

use crate::{Slot, log};

/// Marker distinguishing a header from erased or garbage flash.
pub const MAGIC: [u8; 13] = *b"inki_firmware";

/// Size of [`FirmwareHeader`] in flash.
pub const HEADER_SIZE: usize = 256;

/// Value of `valid_flag` for an image that is complete and intended to run.
pub const VALID: u8 = 1;

/// Metadata describing one firmware image.
///
/// Applications embed one of these at the very start of their image, typically with
/// `#[unsafe(link_section = ".firmware_header")] #[used] static HEADER: FirmwareHeader = FirmwareHeader::new(..);`.
/// The bootloader only ever reads them.
#[repr(C)]
#[derive(Clone, Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FirmwareHeader {
    pub magic: [u8; 13],
    pub valid_flag: u8,
    /// Informational, NUL padded.
    pub build_date: [u8; 16],
    /// `v<major>.<minor>.<patch>-<build>[...]`, NUL padded.
    pub version: [u8; 32],
    /// Declared payload length. Not checked against the slot.
    pub firmware_size: U32<LittleEndian>,
    /// Declared slot identity. Not checked against the physical location.
    pub slot: u8,
    /// Reserved for integrity checking; producers write 0.
    pub crc32: U32<LittleEndian>,
    pub reserved: [u8; 185],
}

const _: () = assert!(core::mem::size_of::<FirmwareHeader>() == HEADER_SIZE);

/// Reason a header does not denote a usable image.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HeaderError {
    /// The producer did not mark the image as complete.
    InvalidFlag,
    /// Not a header at all, e.g. erased flash.
    InvalidMagic,
}

impl core::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HeaderError::InvalidFlag => f.write_str("image not flagged as valid"),
            HeaderError::InvalidMagic => f.write_str("header magic mismatch"),
        }
    }
}

impl core::error::Error for HeaderError {}

impl FirmwareHeader {
    /// Build a header in a `const` context.
    ///
    /// Fails const evaluation if `build_date` or `version` do not fit their fields.
    pub const fn new(
        valid: bool,
        build_date: &str,
        version: &str,
        firmware_size: u32,
        slot: u8,
    ) -> Self {
        FirmwareHeader {
            magic: MAGIC,
            valid_flag: if valid { VALID } else { 0 },
            build_date: text_field(build_date),
            version: text_field(version),
            firmware_size: U32::from_bytes(firmware_size.to_le_bytes()),
            slot,
            crc32: U32::from_bytes([0; 4]),
            reserved: [0; 185],
        }
    }

    /// Check whether this header denotes a usable image.
    ///
    /// Never reads past the header itself.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.valid_flag != VALID {
            return Err(HeaderError::InvalidFlag);
        }
        if self.magic != MAGIC {
            return Err(HeaderError::InvalidMagic);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Version text up to the first NUL.
    pub fn version_text(&self) -> &[u8] {
        until_nul(&self.version)
    }

    /// Build date text up to the first NUL.
    pub fn build_date_text(&self) -> &[u8] {
        until_nul(&self.build_date)
    }

    pub fn firmware_size(&self) -> u32 {
        self.firmware_size.get()
    }

    pub fn crc32(&self) -> u32 {
        self.crc32.get()
    }

    /// Emit every field as status lines.
    pub(crate) fn log_fields(&self, slot: Slot) {
        log::info!("------ Firmware Slot {=u8} ------", slot.0);
        log::info!("Magic        : {=[u8]:a}", &self.magic[..]);
        log::info!("Valid Flag   : {=u8}", self.valid_flag);
        log::info!("Build Date   : {=[u8]:a}", self.build_date_text());
        log::info!("Version      : {=[u8]:a}", self.version_text());
        log::info!("Size         : {=u32} bytes", self.firmware_size());
        log::info!("Slot ID      : {=u8}", self.slot);
        log::info!("CRC32        : {=u32:#010x}", self.crc32());
    }
}

fn until_nul(field: &[u8]) -> &[u8] {
    field
        .iter()
        .position(|&b| b == 0)
        .map_or(field, |end| &field[..end])
}

const fn text_field<const N: usize>(text: &str) -> [u8; N] {
    let bytes = text.as_bytes();
    assert!(bytes.len() <= N, "text does not fit its header field");

    let mut field = [0; N];
    let mut i = 0;
    while i < bytes.len() {
        field[i] = bytes[i];
        i += 1;
    }
    field
}
