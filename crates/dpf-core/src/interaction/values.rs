//! Scalar values carried by interaction details
//!
//! Every type here has a textual form matching what wallets and allow-list
//! documents use (`0x`-prefixed hex for byte strings, decimal for integers) and
//! a fixed-width binary form used by the canonical leaf encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::InvalidInteraction;
use crate::hash::Hash32;

/// Textual wildcard marker.
pub const ANY_MARKER: &str = "any";

/// Alternative textual wildcard marker accepted on input.
pub const ANY_MARKER_SHORT: &str = "*";

/// 32-byte word used for typed-data domain separators and type hashes.
pub type B256 = Hash32;

/// EIP-155 chain identifier.
pub type ChainId = u64;

/// A value slot that either names one concrete value or admits every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field<T> {
    /// Wildcard: matches any concrete value
    Any,
    /// Exactly this value
    Exact(T),
}

impl<T: PartialEq> Field<T> {
    /// Whether `value` is covered by this slot.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Field::Any => true,
            Field::Exact(expected) => expected == value,
        }
    }
}

impl<T> Field<T> {
    /// `true` for the wildcard.
    pub fn is_any(&self) -> bool {
        matches!(self, Field::Any)
    }

    /// The concrete value, if any.
    pub fn exact(&self) -> Option<&T> {
        match self {
            Field::Any => None,
            Field::Exact(value) => Some(value),
        }
    }

    /// Parse a textual slot: the wildcard marker, or a value via `parse`.
    pub fn parse_with<E>(text: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> Result<Self, E> {
        let trimmed = text.trim();
        if is_any_marker(trimmed) {
            Ok(Field::Any)
        } else {
            parse(trimmed).map(Field::Exact)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Any => f.write_str(ANY_MARKER),
            Field::Exact(value) => value.fmt(f),
        }
    }
}

/// Whether `text` is one of the accepted wildcard markers.
pub fn is_any_marker(text: &str) -> bool {
    text.eq_ignore_ascii_case(ANY_MARKER) || text == ANY_MARKER_SHORT
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Parse `0x` followed by 40 hex characters (any case).
    pub fn parse(text: &str) -> Result<Self, InvalidInteraction> {
        let invalid = || InvalidInteraction::InvalidAddress {
            value: text.to_string(),
        };
        let digits = strip_hex_prefix(text.trim()).ok_or_else(invalid)?;
        let mut out = [0u8; 20];
        hex::decode_to_slice(digits, &mut out).map_err(|_| invalid())?;
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = InvalidInteraction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = InvalidInteraction;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Native value attached to a transaction, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Parse a non-negative integer in decimal or `0x` hex.
    pub fn parse(text: &str) -> Result<Self, InvalidInteraction> {
        let trimmed = text.trim();
        let invalid = |reason: &'static str| InvalidInteraction::InvalidValue {
            value: text.to_string(),
            reason,
        };
        if trimmed.starts_with('-') {
            return Err(invalid("value is negative"));
        }
        let parsed = match strip_hex_prefix(trimmed) {
            Some("") => return Err(invalid("value is empty")),
            Some(digits) => {
                if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(invalid("value is not an integer"));
                }
                u128::from_str_radix(digits, 16)
            }
            None if trimmed.is_empty() => return Err(invalid("value is empty")),
            None => {
                if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid("value is not an integer"));
                }
                trimmed.parse::<u128>()
            }
        };
        parsed.map(Amount).map_err(|err| match err.kind() {
            std::num::IntErrorKind::PosOverflow => invalid("value exceeds 128 bits"),
            _ => invalid("value is not an integer"),
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

/// First four bytes of calldata, or the empty calldata of a plain transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// No calldata
    Empty,
    /// A four-byte function selector
    Function([u8; 4]),
}

impl Selector {
    /// Parse `0x` (or the empty string) as [`Selector::Empty`], `0x` + 8 hex as a function.
    pub fn parse(text: &str) -> Result<Self, InvalidInteraction> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Selector::Empty);
        }
        let invalid = || InvalidInteraction::InvalidSelector {
            value: text.to_string(),
        };
        let digits = strip_hex_prefix(trimmed).ok_or_else(invalid)?;
        if digits.is_empty() {
            return Ok(Selector::Empty);
        }
        let mut out = [0u8; 4];
        hex::decode_to_slice(digits, &mut out).map_err(|_| invalid())?;
        Ok(Selector::Function(out))
    }

    /// Selector of the given calldata; shorter than four bytes counts as empty.
    pub fn from_calldata(calldata: &[u8]) -> Self {
        match calldata.get(..4) {
            Some(head) => {
                let mut out = [0u8; 4];
                out.copy_from_slice(head);
                Selector::Function(out)
            }
            None => Selector::Empty,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Empty => f.write_str("0x"),
            Selector::Function(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// Parse a decimal chain id.
pub fn parse_chain_id(text: &str) -> Result<ChainId, InvalidInteraction> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidInteraction::InvalidChainId {
            value: text.to_string(),
        });
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| InvalidInteraction::InvalidChainId {
            value: text.to_string(),
        })
}

/// Parse a 32-byte typed-data word.
pub fn parse_word(field: &'static str, text: &str) -> Result<B256, InvalidInteraction> {
    let trimmed = text.trim();
    if strip_hex_prefix(trimmed).is_none() {
        return Err(InvalidInteraction::InvalidWord {
            field,
            value: text.to_string(),
        });
    }
    B256::from_hex(trimmed).map_err(|_| InvalidInteraction::InvalidWord {
        field,
        value: text.to_string(),
    })
}
