//! In-memory leaf-set store
//!
//! Publisher-side storage: every published leaf set is kept as a built trie
//! keyed by its root, and proofs are served straight from it.

use async_trait::async_trait;
use dpf_core::{Leaf, RootHash};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::{ProofSource, ProofSourceError};
use crate::trie::PatriciaTrie;

/// Tries indexed by root.
#[derive(Debug, Clone, Default)]
pub struct LeafSetStore {
    tries: Arc<RwLock<HashMap<RootHash, PatriciaTrie>>>,
}

impl LeafSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie over `leaves`, keep it, and return its root.
    pub async fn publish<'a, I>(&self, leaves: I) -> RootHash
    where
        I: IntoIterator<Item = &'a Leaf>,
    {
        let trie = PatriciaTrie::from_leaves(leaves);
        let root = trie.root();
        tracing::info!(root = %root, leaves = trie.len(), "published leaf set");
        self.tries.write().await.insert(root, trie);
        root
    }

    /// Forget a published leaf set. Returns whether it was present.
    pub async fn withdraw(&self, root: &RootHash) -> bool {
        let removed = self.tries.write().await.remove(root).is_some();
        if removed {
            tracing::info!(root = %root, "withdrew leaf set");
        }
        removed
    }

    /// Number of leaves under `root`, if published.
    pub async fn leaf_count(&self, root: &RootHash) -> Option<usize> {
        self.tries.read().await.get(root).map(PatriciaTrie::len)
    }

    pub async fn contains_root(&self, root: &RootHash) -> bool {
        self.tries.read().await.contains_key(root)
    }
}

#[async_trait]
impl ProofSource for LeafSetStore {
    async fn membership_proof(
        &self,
        root: &RootHash,
        leaf: &Leaf,
    ) -> Result<Vec<u8>, ProofSourceError> {
        let tries = self.tries.read().await;
        let trie = tries
            .get(root)
            .ok_or(ProofSourceError::NotFound { root: *root })?;
        let proof = trie
            .prove(leaf)
            .map_err(|_| ProofSourceError::NotFound { root: *root })?;
        proof
            .to_bytes()
            .map_err(|e| ProofSourceError::unavailable(e.to_string()))
    }
}
