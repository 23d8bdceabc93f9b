//! Canonical leaf encoding
//!
//! ```text
//! version:u8 = 0x01
//! method:u8
//! fields, fixed order, each 0x00 (wildcard) | 0x01 || value
//!   SendTransaction: chainId u64 BE | address 20 | value u128 BE | selector
//!   SignTypedData:   domainSeparator 32 | typeHash 32
//! selector: 0x00 (empty calldata) | 0x04 || 4 bytes
//! ```
//!
//! Every value is fixed width, so equal patterns always produce equal bytes and
//! distinct patterns always produce distinct bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::{Interaction, Pattern, TransactionPattern, TypedDataPattern};
use super::values::{Address, Amount, Field, Selector, B256};
use super::Method;

/// Version byte leading every leaf.
pub const LEAF_VERSION: u8 = 0x01;

const FIELD_ANY: u8 = 0x00;
const FIELD_EXACT: u8 = 0x01;
const SELECTOR_EMPTY: u8 = 0x00;
const SELECTOR_FUNCTION: u8 = 0x04;

/// Canonical bytes of a pattern; the unit stored in a permission trie.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Leaf(Vec<u8>);

/// Errors from decoding leaf bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeafError {
    #[error("unsupported leaf version {0:#04x}")]
    Version(u8),
    #[error("unknown method tag {0:#04x}")]
    Method(u8),
    #[error("unknown field tag {0:#04x}")]
    FieldTag(u8),
    #[error("unknown selector tag {0:#04x}")]
    SelectorTag(u8),
    #[error("leaf ends early")]
    Truncated,
    #[error("{0} trailing bytes after leaf")]
    Trailing(usize),
}

impl Leaf {
    /// Encode a pattern.
    pub fn encode(pattern: &Pattern) -> Leaf {
        let mut out = Vec::with_capacity(64);
        out.push(LEAF_VERSION);
        out.push(pattern.method().tag());
        match pattern {
            Pattern::SignMessage | Pattern::SignData => {}
            Pattern::SendTransaction(tx) => {
                put_field(&mut out, &tx.chain_id, |out, id| {
                    out.extend_from_slice(&id.to_be_bytes())
                });
                put_field(&mut out, &tx.to, |out, addr| out.extend_from_slice(&addr.0));
                put_field(&mut out, &tx.value, |out, value| {
                    out.extend_from_slice(&value.0.to_be_bytes())
                });
                put_field(&mut out, &tx.selector, |out, selector| match selector {
                    Selector::Empty => out.push(SELECTOR_EMPTY),
                    Selector::Function(bytes) => {
                        out.push(SELECTOR_FUNCTION);
                        out.extend_from_slice(bytes);
                    }
                });
            }
            Pattern::SignTypedData(td) => {
                put_field(&mut out, &td.domain_separator, |out, word| {
                    out.extend_from_slice(word.as_bytes())
                });
                put_field(&mut out, &td.type_hash, |out, word| {
                    out.extend_from_slice(word.as_bytes())
                });
            }
        }
        Leaf(out)
    }

    /// Wrap bytes received from elsewhere without checking them.
    pub fn from_bytes(bytes: Vec<u8>) -> Leaf {
        Leaf(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Decode back into the pattern it encodes.
    pub fn decode(&self) -> Result<Pattern, LeafError> {
        let mut reader = Reader { bytes: &self.0 };
        let version = reader.byte()?;
        if version != LEAF_VERSION {
            return Err(LeafError::Version(version));
        }
        let tag = reader.byte()?;
        let method = Method::from_tag(tag).ok_or(LeafError::Method(tag))?;
        let pattern = match method {
            Method::SignMessage => Pattern::SignMessage,
            Method::SignData => Pattern::SignData,
            Method::SendTransaction => Pattern::SendTransaction(TransactionPattern {
                chain_id: reader.field(|r| Ok(u64::from_be_bytes(r.array()?)))?,
                to: reader.field(|r| Ok(Address(r.array()?)))?,
                value: reader.field(|r| Ok(Amount(u128::from_be_bytes(r.array()?))))?,
                selector: reader.field(|r| match r.byte()? {
                    SELECTOR_EMPTY => Ok(Selector::Empty),
                    SELECTOR_FUNCTION => Ok(Selector::Function(r.array()?)),
                    other => Err(LeafError::SelectorTag(other)),
                })?,
            }),
            Method::SignTypedData => Pattern::SignTypedData(TypedDataPattern {
                domain_separator: reader.field(|r| Ok(B256::new(r.array()?)))?,
                type_hash: reader.field(|r| Ok(B256::new(r.array()?)))?,
            }),
        };
        if !reader.bytes.is_empty() {
            return Err(LeafError::Trailing(reader.bytes.len()));
        }
        Ok(pattern)
    }
}

/// Canonical bytes of a concrete interaction.
///
/// Identical to the leaf of [`Pattern::exact`], so it never contains a
/// wildcard tag.
pub fn canonical_bytes(interaction: &Interaction) -> Leaf {
    Leaf::encode(&Pattern::exact(interaction))
}

impl Interaction {
    /// See [`canonical_bytes`].
    pub fn canonical_bytes(&self) -> Leaf {
        canonical_bytes(self)
    }
}

impl Pattern {
    /// See [`Leaf::encode`].
    pub fn to_leaf(&self) -> Leaf {
        Leaf::encode(self)
    }
}

impl AsRef<[u8]> for Leaf {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leaf(0x{})", hex::encode(&self.0))
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

fn put_field<T>(out: &mut Vec<u8>, field: &Field<T>, put: impl FnOnce(&mut Vec<u8>, &T)) {
    match field {
        Field::Any => out.push(FIELD_ANY),
        Field::Exact(value) => {
            out.push(FIELD_EXACT);
            put(out, value);
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8, LeafError> {
        let (first, rest) = self.bytes.split_first().ok_or(LeafError::Truncated)?;
        self.bytes = rest;
        Ok(*first)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], LeafError> {
        if self.bytes.len() < N {
            return Err(LeafError::Truncated);
        }
        let (head, rest) = self.bytes.split_at(N);
        self.bytes = rest;
        let mut out = [0u8; N];
        out.copy_from_slice(head);
        Ok(out)
    }

    fn field<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, LeafError>,
    ) -> Result<Field<T>, LeafError> {
        match self.byte()? {
            FIELD_ANY => Ok(Field::Any),
            FIELD_EXACT => read(self).map(Field::Exact),
            other => Err(LeafError::FieldTag(other)),
        }
    }
}
