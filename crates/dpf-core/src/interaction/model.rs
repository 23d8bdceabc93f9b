//! Typed interactions and patterns

use serde::{Deserialize, Serialize};

use super::values::{Address, Amount, ChainId, Field, Selector, B256};
use super::{InvalidInteraction, Method};

/// Details of a concrete `SendTransaction` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub chain_id: ChainId,
    pub to: Address,
    pub value: Amount,
    pub selector: Selector,
}

/// Details of a concrete `SignTypedData` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedDataRequest {
    pub domain_separator: B256,
    pub type_hash: B256,
}

/// A concrete interaction a wallet is about to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interaction {
    SignMessage,
    SignData,
    SendTransaction(TransactionRequest),
    SignTypedData(TypedDataRequest),
}

impl Interaction {
    pub fn method(&self) -> Method {
        match self {
            Interaction::SignMessage => Method::SignMessage,
            Interaction::SignData => Method::SignData,
            Interaction::SendTransaction(_) => Method::SendTransaction,
            Interaction::SignTypedData(_) => Method::SignTypedData,
        }
    }
}

/// `SendTransaction` template; each field may be a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionPattern {
    pub chain_id: Field<ChainId>,
    pub to: Field<Address>,
    pub value: Field<Amount>,
    pub selector: Field<Selector>,
}

/// `SignTypedData` template; each field may be a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedDataPattern {
    pub domain_separator: Field<B256>,
    pub type_hash: Field<B256>,
}

/// A declared-allowed interaction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    SignMessage,
    SignData,
    SendTransaction(TransactionPattern),
    SignTypedData(TypedDataPattern),
}

impl Pattern {
    pub fn method(&self) -> Method {
        match self {
            Pattern::SignMessage => Method::SignMessage,
            Pattern::SignData => Method::SignData,
            Pattern::SendTransaction(_) => Method::SendTransaction,
            Pattern::SignTypedData(_) => Method::SignTypedData,
        }
    }

    /// The pattern admitting exactly `interaction` and nothing else.
    pub fn exact(interaction: &Interaction) -> Pattern {
        match interaction {
            Interaction::SignMessage => Pattern::SignMessage,
            Interaction::SignData => Pattern::SignData,
            Interaction::SendTransaction(tx) => Pattern::SendTransaction(TransactionPattern {
                chain_id: Field::Exact(tx.chain_id),
                to: Field::Exact(tx.to),
                value: Field::Exact(tx.value),
                selector: Field::Exact(tx.selector),
            }),
            Interaction::SignTypedData(td) => Pattern::SignTypedData(TypedDataPattern {
                domain_separator: Field::Exact(td.domain_separator),
                type_hash: Field::Exact(td.type_hash),
            }),
        }
    }

    /// Whether every wildcard-capable field is concrete.
    pub fn is_concrete(&self) -> bool {
        Interaction::try_from(self).is_ok()
    }

    /// Number of fields currently holding a wildcard.
    pub fn wildcard_count(&self) -> usize {
        match self {
            Pattern::SignMessage | Pattern::SignData => 0,
            Pattern::SendTransaction(tx) => [
                tx.chain_id.is_any(),
                tx.to.is_any(),
                tx.value.is_any(),
                tx.selector.is_any(),
            ]
            .into_iter()
            .filter(|any| *any)
            .count(),
            Pattern::SignTypedData(td) => [td.domain_separator.is_any(), td.type_hash.is_any()]
                .into_iter()
                .filter(|any| *any)
                .count(),
        }
    }
}

impl From<&Interaction> for Pattern {
    fn from(interaction: &Interaction) -> Self {
        Pattern::exact(interaction)
    }
}

fn concrete<T: Copy>(field: &Field<T>, name: &'static str) -> Result<T, InvalidInteraction> {
    field
        .exact()
        .copied()
        .ok_or(InvalidInteraction::WildcardInRequest { field: name })
}

impl TryFrom<&Pattern> for Interaction {
    type Error = InvalidInteraction;

    fn try_from(pattern: &Pattern) -> Result<Self, Self::Error> {
        Ok(match pattern {
            Pattern::SignMessage => Interaction::SignMessage,
            Pattern::SignData => Interaction::SignData,
            Pattern::SendTransaction(tx) => Interaction::SendTransaction(TransactionRequest {
                chain_id: concrete(&tx.chain_id, "chainId")?,
                to: concrete(&tx.to, "toAddress")?,
                value: concrete(&tx.value, "value")?,
                selector: concrete(&tx.selector, "functionSelector")?,
            }),
            Pattern::SignTypedData(td) => Interaction::SignTypedData(TypedDataRequest {
                domain_separator: concrete(&td.domain_separator, "domainSeparator")?,
                type_hash: concrete(&td.type_hash, "typeHash")?,
            }),
        })
    }
}

/// Whether `pattern` covers `interaction`.
///
/// Methods must agree; each detail field must be a wildcard or equal. A
/// wildcard selector covers every selector including empty calldata, so a
/// pattern with `functionSelector = any` also allows plain value transfers.
pub fn matches(pattern: &Pattern, interaction: &Interaction) -> bool {
    match (pattern, interaction) {
        (Pattern::SignMessage, Interaction::SignMessage) => true,
        (Pattern::SignData, Interaction::SignData) => true,
        (Pattern::SendTransaction(p), Interaction::SendTransaction(tx)) => {
            p.chain_id.admits(&tx.chain_id)
                && p.to.admits(&tx.to)
                && p.value.admits(&tx.value)
                && p.selector.admits(&tx.selector)
        }
        (Pattern::SignTypedData(p), Interaction::SignTypedData(td)) => {
            p.domain_separator.admits(&td.domain_separator) && p.type_hash.admits(&td.type_hash)
        }
        _ => false,
    }
}
