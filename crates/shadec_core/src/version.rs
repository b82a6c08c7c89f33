//! Capability versions (e.g. CUDA SM 7.0).
//!
//! Versions travel through the IR in a packed integer form: `major << 32 | minor << 16 | patch`. The packed form
//! orders the same way as the structured one, so capability tracking can compare either.
//!
//! ## Examples
//! ```rust
//! use shadec_core::SemanticVersion;
//!
//! let sm70 = SemanticVersion::new(7, 0, 0);
//! assert_eq!(SemanticVersion::from_integer(sm70.to_integer()), sm70);
//! assert_eq!("7.0".parse::<SemanticVersion>().unwrap(), sm70);
//! assert_eq!(sm70.to_string(), "7.0");
//! ```

use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u16,
    pub patch: u16,
}

impl SemanticVersion {
    pub const fn new(major: u32, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch }
    }

    /// Unpack a version from its integer form.
    pub const fn from_integer(value: u64) -> Self {
        Self {
            major: (value >> 32) as u32,
            minor: ((value >> 16) & 0xffff) as u16,
            patch: (value & 0xffff) as u16,
        }
    }

    /// Pack a version into its integer form.
    pub const fn to_integer(self) -> u64 {
        ((self.major as u64) << 32) | ((self.minor as u64) << 16) | self.patch as u64
    }
}

impl fmt::Display for SemanticVersion {
    /// Formats as `major.minor`, appending `.patch` only when it is non-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        Ok(())
    }
}

/// Error returned when a version string is not `major[.minor[.patch]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError {
    input: String,
}

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version `{}` (expected `major[.minor[.patch]]`)", self.input)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for SemanticVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError { input: s.to_string() };
        let mut parts = s.trim().split('.');
        let major = parts.next().and_then(|p| p.parse::<u32>().ok()).ok_or_else(err)?;
        let minor = match parts.next() {
            Some(p) => p.parse::<u16>().map_err(|_| err())?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse::<u16>().map_err(|_| err())?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self { major, minor, patch })
    }
}
