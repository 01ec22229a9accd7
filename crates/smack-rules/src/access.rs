//! Access permission bit-set and its textual encodings.
//!
//! Smack rules grant a combination of four permissions. On disk they are
//! written either compactly (`"rw"`) or in the fixed-width kernel form
//! (`"rw--"`):
//!
//! ```rust
//! use smack_rules::{Access, AccessFormat};
//!
//! let access = Access::decode("WR");
//! assert_eq!(access, Access::READ | Access::WRITE);
//! assert_eq!(access.encode(AccessFormat::Compact), "rw");
//! assert_eq!(access.encode(AccessFormat::Kernel), "rw--");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Width of the kernel access field.
pub const KERNEL_ACCESS_LEN: usize = 4;

/// Textual representation used when encoding an [`Access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessFormat {
    /// Only the granted permissions, e.g. `"rx"`.
    #[default]
    Compact,
    /// Always four characters, `-` for each missing permission, e.g. `"r-x-"`.
    Kernel,
}

/// A set of Smack permissions.
///
/// Bit 3 (value 8) is unused; the layout matches the kernel's so masks can be
/// exchanged without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Access(u32);

// Canonical output order.
const CODES: [(char, Access); 4] = [
    ('r', Access::READ),
    ('w', Access::WRITE),
    ('x', Access::EXECUTE),
    ('a', Access::APPEND),
];

impl Access {
    /// No permissions.
    pub const NONE: Access = Access(0);
    /// Read permission.
    pub const READ: Access = Access(1);
    /// Write permission.
    pub const WRITE: Access = Access(2);
    /// Execute permission.
    pub const EXECUTE: Access = Access(4);
    /// Append permission.
    pub const APPEND: Access = Access(16);
    /// Every permission.
    pub const ALL: Access = Access(1 | 2 | 4 | 16);

    /// Builds a set from raw bits, returning `None` if any bit outside
    /// [`Access::ALL`] is set.
    pub fn from_bits(bits: u32) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Builds a set from raw bits, dropping any bit outside [`Access::ALL`].
    pub fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no permission is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every permission in `other` is also in `self`.
    pub fn contains(self, other: Access) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses an access string.
    ///
    /// Matching is case-insensitive and order-insensitive. Characters other
    /// than `r`, `w`, `x` and `a` are ignored, so this never fails.
    pub fn decode(text: &str) -> Self {
        text.chars()
            .filter_map(|c| {
                let c = c.to_ascii_lowercase();
                CODES.iter().find(|(code, _)| *code == c).map(|(_, a)| *a)
            })
            .fold(Self::NONE, |acc, a| acc | a)
    }

    /// Encodes the set in the requested format.
    pub fn encode(self, format: AccessFormat) -> String {
        match format {
            AccessFormat::Compact => CODES
                .iter()
                .filter(|(_, a)| self.contains(*a))
                .map(|(code, _)| *code)
                .collect(),
            AccessFormat::Kernel => CODES
                .iter()
                .map(|(code, a)| if self.contains(*a) { *code } else { '-' })
                .collect(),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(AccessFormat::Compact))
    }
}

impl FromStr for Access {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::decode(s))
    }
}

impl From<&str> for Access {
    fn from(s: &str) -> Self {
        Self::decode(s)
    }
}

impl BitOr for Access {
    type Output = Access;

    fn bitor(self, rhs: Access) -> Access {
        Access(self.0 | rhs.0)
    }
}

impl BitOrAssign for Access {
    fn bitor_assign(&mut self, rhs: Access) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Access {
    type Output = Access;

    fn bitand(self, rhs: Access) -> Access {
        Access(self.0 & rhs.0)
    }
}

impl Serialize for Access {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode(AccessFormat::Compact))
    }
}

impl<'de> Deserialize<'de> for Access {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::decode(&text))
    }
}
