//! Content identifier - the 16-byte GUID that names every node in the store.
//!
//! The store hands identifiers around in three textual shapes, all of which
//! parse to the same value:
//!
//! - hyphenated: `1a2b3c4d-0000-1111-2222-333344445555`
//! - braced: `{1A2B3C4D-0000-1111-2222-333344445555}`
//! - compact (media URLs): `1a2b3c4d000011112222333344445555`

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 16-byte content identifier.
///
/// Bytes are kept in display order, so `Ord` matches the lexical order of
/// the hyphenated form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContentId {
    bytes: [u8; 16],
}

impl ContentId {
    /// Empty identifier (all zeros).
    pub const EMPTY: Self = Self { bytes: [0; 16] };

    /// Create a new identifier from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes of the identifier.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Check if the identifier is empty (all zeros).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == [0; 16]
    }

    /// Format as the compact 32-digit form used in media URLs.
    pub fn to_compact(&self) -> String {
        let mut out = String::with_capacity(32);
        for b in &self.bytes {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    /// Format as the braced upper-case form used inside field markup.
    pub fn to_braced(&self) -> String {
        format!("{{{}}}", self.to_string().to_uppercase())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3],
            b[4], b[5],
            b[6], b[7],
            b[8], b[9],
            b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| Error::InvalidId {
            value: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let inner = match (trimmed.strip_prefix('{'), trimmed.strip_suffix('}')) {
            (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
            (None, None) => trimmed,
            _ => return Err(invalid("unbalanced braces".into())),
        };

        let digits: Vec<u8> = match inner.len() {
            36 => {
                let raw = inner.as_bytes();
                if raw[8] != b'-' || raw[13] != b'-' || raw[18] != b'-' || raw[23] != b'-' {
                    return Err(invalid("invalid hyphen positions".into()));
                }
                raw.iter().copied().filter(|&c| c != b'-').collect()
            }
            32 => inner.as_bytes().to_vec(),
            n => {
                return Err(invalid(format!("expected 32 or 36 characters, got {}", n)));
            }
        };

        if digits.len() != 32 {
            return Err(invalid("misplaced hyphen".into()));
        }

        let mut bytes = [0u8; 16];
        for (i, pair) in digits.chunks_exact(2).enumerate() {
            let hi = hex_value(pair[0])
                .ok_or_else(|| invalid(format!("invalid hex at position {}", i * 2)))?;
            let lo = hex_value(pair[1])
                .ok_or_else(|| invalid(format!("invalid hex at position {}", i * 2 + 1)))?;
            bytes[i] = (hi << 4) | lo;
        }

        Ok(Self { bytes })
    }
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
