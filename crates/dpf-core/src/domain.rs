//! Domain names and their hierarchy
//!
//! A policy is published per DNS name. Lookups walk from the most specific name
//! towards the top-level label, so `sub.example.com` is governed by its own
//! record if one exists, otherwise by `example.com`, otherwise by `com`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a full domain name in its textual form.
pub const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label.
pub const MAX_LABEL_LEN: usize = 63;

/// A normalized, syntactically valid DNS name.
///
/// Normalization lowercases ASCII letters and drops a single trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

/// Errors from parsing a domain name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("domain name is empty")]
    Empty,
    #[error("domain name exceeds {MAX_DOMAIN_LEN} characters")]
    TooLong,
    #[error("label {label:?} is empty or longer than {MAX_LABEL_LEN} characters")]
    BadLabelLength { label: String },
    #[error("label {label:?} contains characters outside [a-z0-9-_]")]
    BadCharacter { label: String },
    #[error("label {label:?} starts or ends with a hyphen")]
    BadHyphen { label: String },
}

impl DomainName {
    /// Parse and normalize a domain name.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(DomainError::Empty);
        }
        if trimmed.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::TooLong);
        }
        let normalized = trimmed.to_ascii_lowercase();
        for label in normalized.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(DomainError::BadLabelLength {
                    label: label.to_string(),
                });
            }
            if !label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
            {
                return Err(DomainError::BadCharacter {
                    label: label.to_string(),
                });
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(DomainError::BadHyphen {
                    label: label.to_string(),
                });
            }
        }
        Ok(Self(normalized))
    }

    /// The normalized textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The enclosing domain, `None` for a top-level label.
    pub fn parent(&self) -> Option<DomainName> {
        self.0
            .split_once('.')
            .map(|(_, rest)| DomainName(rest.to_string()))
    }

    /// This name followed by each enclosing name, most specific first.
    ///
    /// `sub.example.com` yields `sub.example.com`, `example.com`, `com`.
    pub fn hierarchy(&self) -> impl Iterator<Item = DomainName> {
        std::iter::successors(Some(self.clone()), DomainName::parent)
    }

    /// Number of labels in the name.
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}
