//! Deciding which slot to boot, once per reset.
//!
//! | slot 0  | slot 1  | decision                                                   |
//! |---------|---------|------------------------------------------------------------|
//! | valid   | valid   | newest version, slot 0 on a tie or if any version is unparsable |
//! | valid   | invalid | slot 0                                                     |
//! | invalid | valid   | slot 1                                                     |
//! | invalid | invalid | halt                                                       |
//!
//! Note that when a version is unparsable slot 0 is booted even when it is slot 0's own version
//! that failed to parse and slot 1 carries a perfectly good one.

use serde::{Deserialize, Serialize};
use zerocopy::FromZeros;

use crate::{Device, FirmwareHeader, Slot, Version, log};

/// Why a slot was chosen.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Reason {
    /// Both slots are valid and this one is not older than the other.
    Newest,
    /// Both slots are valid but at least one version is unparsable.
    VersionFallback,
    /// The other slot is invalid.
    OnlyValid,
}

/// Outcome of slot selection.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Decision {
    Boot { slot: Slot, reason: Reason },
    /// No slot holds a valid image.
    Halt,
}

/// Choose between the images described by the headers of slot 0 and slot 1.
pub fn select(slot0: &FirmwareHeader, slot1: &FirmwareHeader) -> Decision {
    let valid0 = is_valid(Slot::ZERO, slot0);
    let valid1 = is_valid(Slot::ONE, slot1);

    match (valid0, valid1) {
        (true, true) => {
            let version0 = parse(Slot::ZERO, slot0);
            let version1 = parse(Slot::ONE, slot1);

            match (version0, version1) {
                (Some(version0), Some(version1)) => Decision::Boot {
                    slot: if version0 >= version1 {
                        Slot::ZERO
                    } else {
                        Slot::ONE
                    },
                    reason: Reason::Newest,
                },
                _ => Decision::Boot {
                    slot: Slot::ZERO,
                    reason: Reason::VersionFallback,
                },
            }
        }
        (true, false) => Decision::Boot {
            slot: Slot::ZERO,
            reason: Reason::OnlyValid,
        },
        (false, true) => Decision::Boot {
            slot: Slot::ONE,
            reason: Reason::OnlyValid,
        },
        (false, false) => Decision::Halt,
    }
}

fn is_valid(slot: Slot, header: &FirmwareHeader) -> bool {
    match header.validate() {
        Ok(()) => true,
        Err(e) => {
            log::info!("Slot {=u8} invalid: {}", slot.0, e);
            false
        }
    }
}

fn parse(slot: Slot, header: &FirmwareHeader) -> Option<Version> {
    match Version::parse(header.version_text()) {
        Ok(version) => {
            log::debug!("Parsed slot {=u8}: {}", slot.0, version);
            Some(version)
        }
        Err(e) => {
            log::warn!("Slot {=u8} version unparsable: {}", slot.0, e);
            None
        }
    }
}

/// Read both headers from `device` and decide which slot to boot.
///
/// A header that cannot be read counts as invalid.
pub async fn decide(device: &mut impl Device) -> Decision {
    let mut headers = [FirmwareHeader::new_zeroed(), FirmwareHeader::new_zeroed()];

    for slot in Slot::ALL {
        match device.read_header(slot).await {
            Ok(header) => {
                header.log_fields(slot);
                headers[slot.index()] = header;
            }
            Err(e) => log::warn!("Slot {=u8} unreadable: {}", slot.0, e),
        }
    }

    log::info!("------ Looking for newest valid firmware ------");
    let [slot0, slot1] = &headers;
    let decision = select(slot0, slot1);

    match decision {
        Decision::Boot { slot, reason } => {
            log::info!("Booting slot {=u8} ({})", slot.0, reason)
        }
        Decision::Halt => log::warn!("No valid firmware found, halting"),
    }

    decision
}

/// Boot the newest valid slot of `device`, or halt if there is none. Never returns.
pub async fn run(mut device: impl Device) -> ! {
    match decide(&mut device).await {
        Decision::Boot { slot, .. } => device.boot(slot),
        Decision::Halt => device.halt(),
    }
}
