//! Interaction model
//!
//! Three shapes of the same data flow through the framework:
//!
//! - [`RawInteraction`]: the loose, string-typed form a wallet hands over or a
//!   publisher writes into an allow-list document. It can be malformed.
//! - [`Interaction`]: a typed, fully concrete request. Method and details agree
//!   by construction.
//! - [`Pattern`]: a typed template whose wildcard-capable fields may be
//!   [`Field::Any`]. Its canonical encoding is a [`Leaf`].

mod leaf;
mod model;
mod pattern_set;
mod raw;
mod values;

pub use leaf::{canonical_bytes, Leaf, LeafError, LEAF_VERSION};
pub use model::{
    matches, Interaction, Pattern, TransactionPattern, TransactionRequest, TypedDataPattern,
    TypedDataRequest,
};
pub use pattern_set::PatternSet;
pub use raw::{validate, RawDetails, RawInteraction, RawTransaction, RawTypedData};
pub use values::{
    is_any_marker, parse_chain_id, parse_word, Address, Amount, ChainId, Field, Selector, B256,
    ANY_MARKER,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of wallet interaction being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    SignMessage,
    SignData,
    SendTransaction,
    SignTypedData,
}

impl Method {
    /// All methods, in tag order.
    pub const ALL: [Method; 4] = [
        Method::SignMessage,
        Method::SignData,
        Method::SendTransaction,
        Method::SignTypedData,
    ];

    /// Byte identifying the method in the canonical encoding.
    pub const fn tag(self) -> u8 {
        match self {
            Method::SignMessage => 0x01,
            Method::SignData => 0x02,
            Method::SendTransaction => 0x03,
            Method::SignTypedData => 0x04,
        }
    }

    /// Inverse of [`Method::tag`].
    pub const fn from_tag(tag: u8) -> Option<Method> {
        match tag {
            0x01 => Some(Method::SignMessage),
            0x02 => Some(Method::SignData),
            0x03 => Some(Method::SendTransaction),
            0x04 => Some(Method::SignTypedData),
            _ => None,
        }
    }

    /// Number of detail fields that may hold a wildcard.
    ///
    /// Probing an interaction of this method takes `2^k` trie lookups.
    pub const fn wildcard_fields(self) -> usize {
        match self {
            Method::SignMessage | Method::SignData => 0,
            Method::SendTransaction => 4,
            Method::SignTypedData => 2,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::SignMessage => "SignMessage",
            Method::SignData => "SignData",
            Method::SendTransaction => "SendTransaction",
            Method::SignTypedData => "SignTypedData",
        };
        f.write_str(name)
    }
}

/// Structural problems with a supplied interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInteraction {
    #[error("{method} requires details but none were supplied")]
    MissingDetails { method: Method },

    #[error("details do not belong to method {method}")]
    DetailsMismatch { method: Method },

    #[error("chain id {value:?} is not an unsigned integer")]
    InvalidChainId { value: String },

    #[error("address {value:?} is not 0x followed by 40 hex characters")]
    InvalidAddress { value: String },

    #[error("value {value:?} rejected: {reason}")]
    InvalidValue { value: String, reason: &'static str },

    #[error("selector {value:?} is neither empty nor exactly 4 bytes")]
    InvalidSelector { value: String },

    #[error("{field} {value:?} is not a 32-byte hex word")]
    InvalidWord { field: &'static str, value: String },

    #[error("requested interaction carries a wildcard in {field}")]
    WildcardInRequest { field: &'static str },
}
