//! Trie error handling

use dpf_core::DpfError;

/// Errors raised while building proofs or moving them over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    /// The target leaf is not part of the leaf set
    #[error("leaf not found in trie")]
    NotFound,

    /// A proof could not be encoded or decoded
    #[error("proof codec failed: {message}")]
    Codec { message: String },
}

impl TrieError {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}

impl From<TrieError> for DpfError {
    fn from(err: TrieError) -> Self {
        match err {
            TrieError::NotFound => DpfError::not_found(err.to_string()),
            TrieError::Codec { message } => DpfError::serialization(message),
        }
    }
}

/// Result type for trie operations
pub type TrieResult<T> = std::result::Result<T, TrieError>;
