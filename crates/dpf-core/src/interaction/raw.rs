//! Loose, string-typed interactions as supplied by wallets and publishers

use serde::{Deserialize, Serialize};

use super::model::{Interaction, Pattern, TransactionPattern, TypedDataPattern};
use super::values::{parse_chain_id, parse_word, Address, Amount, Field, Selector};
use super::{InvalidInteraction, Method};

/// `SendTransaction` details in textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTransaction {
    pub chain_id: String,
    pub to_address: String,
    pub value: String,
    #[serde(default)]
    pub function_selector: String,
}

/// `SignTypedData` details in textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTypedData {
    pub domain_separator: String,
    pub type_hash: String,
}

/// Method-specific details; the shape is recognized from the field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDetails {
    Transaction(RawTransaction),
    TypedData(RawTypedData),
}

/// An interaction or pattern exactly as received.
///
/// ```json
/// { "method": "SendTransaction",
///   "details": { "chainId": "1", "toAddress": "0x…", "value": "any", "functionSelector": "0x" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInteraction {
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RawDetails>,
}

impl RawInteraction {
    /// Parse into a pattern. Wildcard markers are accepted in every
    /// wildcard-capable field.
    pub fn to_pattern(&self) -> Result<Pattern, InvalidInteraction> {
        let method = self.method;
        match (method, &self.details) {
            (Method::SignMessage, None) => Ok(Pattern::SignMessage),
            (Method::SignData, None) => Ok(Pattern::SignData),
            (Method::SendTransaction, Some(RawDetails::Transaction(tx))) => {
                Ok(Pattern::SendTransaction(TransactionPattern {
                    chain_id: Field::parse_with(&tx.chain_id, parse_chain_id)?,
                    to: Field::parse_with(&tx.to_address, Address::parse)?,
                    value: Field::parse_with(&tx.value, Amount::parse)?,
                    selector: Field::parse_with(&tx.function_selector, Selector::parse)?,
                }))
            }
            (Method::SignTypedData, Some(RawDetails::TypedData(td))) => {
                Ok(Pattern::SignTypedData(TypedDataPattern {
                    domain_separator: Field::parse_with(&td.domain_separator, |text| {
                        parse_word("domainSeparator", text)
                    })?,
                    type_hash: Field::parse_with(&td.type_hash, |text| {
                        parse_word("typeHash", text)
                    })?,
                }))
            }
            (Method::SendTransaction | Method::SignTypedData, None) => {
                Err(InvalidInteraction::MissingDetails { method })
            }
            _ => Err(InvalidInteraction::DetailsMismatch { method }),
        }
    }

    /// Parse into a concrete request; wildcard markers are rejected.
    pub fn to_interaction(&self) -> Result<Interaction, InvalidInteraction> {
        Interaction::try_from(&self.to_pattern()?)
    }
}

/// Structural validation of a raw interaction.
///
/// Fails when the details do not belong to the method, when a selector is
/// neither empty, four bytes, nor the wildcard marker, or when a value is
/// neither a non-negative integer nor the wildcard marker.
pub fn validate(raw: &RawInteraction) -> Result<(), InvalidInteraction> {
    raw.to_pattern().map(|_| ())
}

impl From<&Pattern> for RawInteraction {
    fn from(pattern: &Pattern) -> Self {
        let details = match pattern {
            Pattern::SignMessage | Pattern::SignData => None,
            Pattern::SendTransaction(tx) => Some(RawDetails::Transaction(RawTransaction {
                chain_id: tx.chain_id.to_string(),
                to_address: tx.to.to_string(),
                value: tx.value.to_string(),
                function_selector: tx.selector.to_string(),
            })),
            Pattern::SignTypedData(td) => Some(RawDetails::TypedData(RawTypedData {
                domain_separator: render_word(&td.domain_separator),
                type_hash: render_word(&td.type_hash),
            })),
        };
        RawInteraction {
            method: pattern.method(),
            details,
        }
    }
}

impl From<&Interaction> for RawInteraction {
    fn from(interaction: &Interaction) -> Self {
        RawInteraction::from(&Pattern::exact(interaction))
    }
}

fn render_word(field: &Field<super::B256>) -> String {
    match field {
        Field::Any => super::ANY_MARKER.to_string(),
        Field::Exact(word) => format!("0x{}", word.to_hex()),
    }
}
