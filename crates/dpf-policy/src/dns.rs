//! DNS TXT record adapter
//!
//! Domains announce their policy root as a TXT record of the form
//! `v=dpf1 <64 hex characters>`. This module parses such records and defines
//! the seam through which they are looked up; resolving DNS is left to the
//! integrator.

use async_trait::async_trait;
use dpf_core::{DomainName, RootHash};
use std::sync::Arc;

use crate::errors::{RecordError, RecordSourceError};

/// Version tag every policy record starts with.
pub const RECORD_TAG: &str = "v=dpf1";

const ROOT_HEX_LEN: usize = 64;

/// Parse one TXT record into the root it announces.
pub fn parse_txt_record(txt: &str) -> Result<RootHash, RecordError> {
    if !is_tagged(txt) {
        return Err(RecordError::MissingTag { tag: RECORD_TAG });
    }
    let body = txt.trim().strip_prefix(RECORD_TAG).unwrap_or_default();

    let mut tokens = body.split_whitespace();
    let root = tokens.next().ok_or_else(|| RecordError::MalformedRoot {
        reason: "root is missing".to_string(),
    })?;
    if tokens.next().is_some() {
        return Err(RecordError::MalformedRoot {
            reason: "unexpected text after root".to_string(),
        });
    }
    if root.len() != ROOT_HEX_LEN || !root.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RecordError::MalformedRoot {
            reason: format!("expected {} hex characters, got {:?}", ROOT_HEX_LEN, root),
        });
    }
    RootHash::from_hex(root).map_err(|e| RecordError::MalformedRoot {
        reason: e.to_string(),
    })
}

/// The tag alone, or the tag followed by whitespace.
fn is_tagged(txt: &str) -> bool {
    txt.trim()
        .strip_prefix(RECORD_TAG)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Pick the policy root out of every TXT string published for one name.
///
/// Untagged strings (SPF, site verification and the like) are ignored.
/// `Ok(None)` means the name publishes no policy.
pub fn select_policy_record<'a, I>(txts: I) -> Result<Option<RootHash>, RecordError>
where
    I: IntoIterator<Item = &'a str>,
{
    let tagged: Vec<&str> = txts.into_iter().filter(|txt| is_tagged(txt)).collect();
    match tagged.as_slice() {
        [] => Ok(None),
        [single] => parse_txt_record(single).map(Some),
        many => Err(RecordError::Ambiguous { count: many.len() }),
    }
}

/// Looks up the TXT records published for a domain.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every TXT string published at exactly `domain`, empty when there are none.
    async fn txt_records(&self, domain: &DomainName) -> Result<Vec<String>, RecordSourceError>;
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for Arc<T> {
    async fn txt_records(&self, domain: &DomainName) -> Result<Vec<String>, RecordSourceError> {
        (**self).txt_records(domain).await
    }
}
