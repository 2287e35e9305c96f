//! Permission Mask
//!
//! The bits cleared from the mode of newly created files and sockets.
//! Only the nine permission bits (`0o777`) are meaningful.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing or validating a permission mask
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseMaskError {
    /// Input is not an octal number
    #[error("invalid octal permission mask: {0:?}")]
    InvalidOctal(String),

    /// Value has bits outside 0o777
    #[error("permission mask {0:#o} is out of range (max 0o777)")]
    OutOfRange(u32),
}

/// A file-creation permission mask (umask)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PermissionMask(u32);

impl PermissionMask {
    /// Highest valid mask
    pub const MAX: u32 = 0o777;

    /// Sockets and files accessible by the owner only (0077)
    pub const OWNER_ONLY: Self = Self(0o077);

    /// Owner read/write, group read, no access for others (0027)
    pub const GROUP_READ: Self = Self(0o027);

    /// The common system default (0022)
    pub const DEFAULT: Self = Self(0o022);

    /// Create a mask, rejecting bits outside 0o777
    pub fn new(bits: u32) -> Result<Self, ParseMaskError> {
        if bits > Self::MAX {
            return Err(ParseMaskError::OutOfRange(bits));
        }
        Ok(Self(bits))
    }

    /// Create a mask, silently dropping bits outside 0o777
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::MAX)
    }

    /// Raw mask bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Permission bits a new entry requested with `mode` ends up with
    #[must_use]
    pub const fn apply(self, mode: u32) -> u32 {
        mode & !self.0 & Self::MAX
    }
}

impl TryFrom<u32> for PermissionMask {
    type Error = ParseMaskError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<PermissionMask> for u32 {
    fn from(mask: PermissionMask) -> Self {
        mask.0
    }
}

impl FromStr for PermissionMask {
    type Err = ParseMaskError;

    /// Accepts `077`, `0077` and `0o077`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0o")
            .or_else(|| trimmed.strip_prefix("0O"))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(8)) {
            return Err(ParseMaskError::InvalidOctal(s.to_string()));
        }

        let bits = u32::from_str_radix(digits, 8)
            .map_err(|_| ParseMaskError::InvalidOctal(s.to_string()))?;
        Self::new(bits)
    }
}

impl fmt::Display for PermissionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
