//! Proof source seam
//!
//! Verifiers never hold a publisher's leaf set. They ask an external store for
//! the encoded membership proof of one leaf under one root and check it
//! themselves against the root they trust.

use async_trait::async_trait;
use dpf_core::{DpfError, Leaf, RootHash};
use std::sync::Arc;

/// Failures reported by a proof source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofSourceError {
    /// The store knows no proof for this leaf under this root
    #[error("no membership proof under root {root}")]
    NotFound { root: RootHash },

    /// The store could not be reached or failed internally
    #[error("proof source unavailable: {message}")]
    Unavailable { message: String },
}

impl ProofSourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<ProofSourceError> for DpfError {
    fn from(err: ProofSourceError) -> Self {
        match err {
            ProofSourceError::NotFound { .. } => DpfError::not_found(err.to_string()),
            ProofSourceError::Unavailable { message } => DpfError::unavailable(message),
        }
    }
}

/// Serves encoded membership proofs keyed by root.
#[async_trait]
pub trait ProofSource: Send + Sync {
    /// Encoded proof of `leaf` under `root`, in the form produced by
    /// [`MembershipProof::to_bytes`](crate::MembershipProof::to_bytes).
    async fn membership_proof(
        &self,
        root: &RootHash,
        leaf: &Leaf,
    ) -> Result<Vec<u8>, ProofSourceError>;
}

#[async_trait]
impl<T: ProofSource + ?Sized> ProofSource for Arc<T> {
    async fn membership_proof(
        &self,
        root: &RootHash,
        leaf: &Leaf,
    ) -> Result<Vec<u8>, ProofSourceError> {
        (**self).membership_proof(root, leaf).await
    }
}
