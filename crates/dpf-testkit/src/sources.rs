//! Proof-source doubles
//!
//! [`ScriptedSource`] serves real proofs from a [`LeafSetStore`] unless a
//! root has been scripted to misbehave.

use async_trait::async_trait;
use dpf_core::{Leaf, RootHash};
use dpf_trie::{LeafSetStore, ProofSource, ProofSourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Misbehaviour for every request under one root.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Never answer
    Stall,
    /// Answer `Unavailable`
    Fail(String),
    /// Answer with these bytes instead of a proof
    Garbage(Vec<u8>),
    /// Serve the proof of a different leaf under the same root
    WrongLeaf(Leaf),
}

#[derive(Debug, Default)]
pub struct ScriptedSource {
    store: LeafSetStore,
    scripts: Mutex<HashMap<RootHash, Scripted>>,
    requests: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(store: LeafSetStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &LeafSetStore {
        &self.store
    }

    pub fn script(&self, root: RootHash, behaviour: Scripted) {
        self.scripts.lock().unwrap().insert(root, behaviour);
    }

    pub fn clear(&self, root: &RootHash) {
        self.scripts.lock().unwrap().remove(root);
    }

    /// Number of proof requests received so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProofSource for ScriptedSource {
    async fn membership_proof(
        &self,
        root: &RootHash,
        leaf: &Leaf,
    ) -> Result<Vec<u8>, ProofSourceError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().get(root).cloned();
        match script {
            None => self.store.membership_proof(root, leaf).await,
            Some(Scripted::Stall) => std::future::pending().await,
            Some(Scripted::Fail(message)) => Err(ProofSourceError::unavailable(message)),
            Some(Scripted::Garbage(bytes)) => Ok(bytes),
            Some(Scripted::WrongLeaf(other)) => self.store.membership_proof(root, &other).await,
        }
    }
}
