//! Pure synchronous hashing for leaf keys and trie commitments
//!
//! Hashing is deterministic and free of side effects, so it is exposed as plain
//! functions rather than through a trait object handed around at runtime. The
//! algorithm is declared once here; every trie node and leaf key goes through
//! [`hash`] or [`tagged_hash`].
//!
//! Current algorithm: **SHA-256** (256-bit / 32-byte output)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of every digest produced by this module.
pub const HASH_LEN: usize = 32;

/// Hash arbitrary bytes to a 32-byte digest.
#[inline]
pub fn hash(data: &[u8]) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a sequence of parts behind a one-byte domain tag.
///
/// `tagged_hash(t, &[a, b])` equals `hash(t || a || b)`. The tag keeps leaf keys,
/// leaf nodes, extensions and branches in disjoint preimage spaces.
pub fn tagged_hash(tag: u8, parts: &[&[u8]]) -> [u8; HASH_LEN] {
    let mut hasher = Sha256::new();
    hasher.update([tag]);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A 32-byte digest.
///
/// Textual form is lowercase hex without prefix; parsing also accepts a `0x`
/// prefix and uppercase digits. Serde uses the textual form so digests read
/// naturally in JSON and TOML documents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash32(pub [u8; HASH_LEN]);

/// Root digest of a published leaf set.
pub type RootHash = Hash32;

impl Hash32 {
    /// The all-zero digest, used as the root of an empty trie.
    pub const ZERO: Hash32 = Hash32([0u8; HASH_LEN]);

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Hash `data` into a digest.
    pub fn of(data: &[u8]) -> Self {
        Self(hash(data))
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, HashParseError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.len() != HASH_LEN * 2 {
            return Err(HashParseError::Length {
                actual: digits.len(),
            });
        }
        let mut out = [0u8; HASH_LEN];
        hex::decode_to_slice(digits, &mut out).map_err(|_| HashParseError::NotHex)?;
        Ok(Self(out))
    }
}

/// Errors from parsing a textual digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashParseError {
    #[error("expected 64 hex characters, found {actual}")]
    Length { actual: usize },
    #[error("digest contains non-hex characters")]
    NotHex,
}

impl From<[u8; HASH_LEN]> for Hash32 {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps tracing output readable
        write!(f, "Hash32({}..)", &self.to_hex()[..12])
    }
}

impl FromStr for Hash32 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            Self::from_hex(&text).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}
