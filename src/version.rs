//! Version extracted from a header's version text.
//!
//! Only the leading `v<major>.<minor>.<patch>-<build>` is significant, anything after the
//! build number (e.g. `-g1a2b3c-dirty`) is ignored.

use serde::{Deserialize, Serialize};

/// Parsed version, ordered field by field from `major` down to `build`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub build: u32,
}

/// Version text does not start with `v<uint>.<uint>.<uint>-<uint>`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VersionError {
    /// Text does not start with `v`.
    MissingPrefix,
    /// A field has no digits.
    MissingNumber,
    /// A field is not followed by its `.` or `-`.
    MissingSeparator,
}

impl core::fmt::Display for VersionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VersionError::MissingPrefix => f.write_str("version does not start with 'v'"),
            VersionError::MissingNumber => f.write_str("version field is not a number"),
            VersionError::MissingSeparator => f.write_str("version field separator missing"),
        }
    }
}

impl core::error::Error for VersionError {}

impl Version {
    /// Parse the leading `v<major>.<minor>.<patch>-<build>` of `text`.
    ///
    /// Fields are plain ASCII digits; no whitespace or sign is accepted.
    /// Digit runs too large for 32 bits wrap. `major`, `minor` and `patch` keep their low 8 bits.
    pub fn parse(text: &[u8]) -> Result<Self, VersionError> {
        let rest = text.strip_prefix(b"v").ok_or(VersionError::MissingPrefix)?;
        let (major, rest) = number(rest)?;
        let rest = separator(rest, b'.')?;
        let (minor, rest) = number(rest)?;
        let rest = separator(rest, b'.')?;
        let (patch, rest) = number(rest)?;
        let rest = separator(rest, b'-')?;
        let (build, _) = number(rest)?;

        Ok(Version {
            major: major as u8,
            minor: minor as u8,
            patch: patch as u8,
            build,
        })
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{}.{}.{}-{}", self.major, self.minor, self.patch, self.build)
    }
}

fn number(text: &[u8]) -> Result<(u32, &[u8]), VersionError> {
    let digits = text.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(VersionError::MissingNumber);
    }

    let value = text[..digits].iter().fold(0u32, |acc, &digit| {
        acc.wrapping_mul(10).wrapping_add(u32::from(digit - b'0'))
    });
    Ok((value, &text[digits..]))
}

fn separator(text: &[u8], expected: u8) -> Result<&[u8], VersionError> {
    match text.split_first() {
        Some((&found, rest)) if found == expected => Ok(rest),
        _ => Err(VersionError::MissingSeparator),
    }
}
