//! Permission evaluation
//!
//! Decides one interaction against one policy record:
//!
//! 1. pick the authoritative roots for `now` (current, plus previous inside
//!    the grace window)
//! 2. expand the interaction into its `2^k` candidate leaves
//! 3. fetch and verify a membership proof for every (root, leaf) pair,
//!    concurrently and each bounded by the proof timeout
//!
//! The first verified pair allows. Otherwise the interaction is denied, with
//! source failures reported distinctly from an explicit "no match".

use dpf_core::{DpfConfig, Interaction, Leaf, RawInteraction, RootHash, Timestamp};
use dpf_trie::{verify_encoded, ProofSource, ProofSourceError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;

use crate::decision::{Allowance, Decision, Denial};
use crate::expand::expand;
use crate::record::PolicyRecord;

/// Outcome of one (root, leaf) proof lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Verified,
    NotFound,
    Rejected,
    TimedOut,
    Unavailable(String),
}

/// Evaluates interactions against policy records using proofs from `S`.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator<S> {
    source: S,
    config: DpfConfig,
    grace_window: Duration,
}

impl<S: ProofSource> PermissionEvaluator<S> {
    pub fn new(source: S, config: DpfConfig) -> Self {
        let grace_window = config.grace_window();
        Self {
            source,
            config,
            grace_window,
        }
    }

    /// Use `grace_window` instead of the configured one, so that evaluation
    /// agrees with the registry that sweeps the records.
    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.grace_window = grace_window;
        self
    }

    pub fn config(&self) -> &DpfConfig {
        &self.config
    }

    pub fn grace_window(&self) -> Duration {
        self.grace_window
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Decide `interaction` under `policy` at `now`.
    pub async fn evaluate(
        &self,
        interaction: &Interaction,
        policy: &PolicyRecord,
        now: Timestamp,
    ) -> Decision {
        let roots = policy.authoritative_roots(now, self.grace_window);
        let leaves = expand(interaction);
        tracing::debug!(
            method = %interaction.method(),
            roots = roots.len(),
            candidates = leaves.len(),
            "evaluating interaction"
        );

        let mut pending: FuturesUnordered<_> = roots
            .iter()
            .flat_map(|root| leaves.iter().map(move |leaf| self.lookup(root, leaf)))
            .collect();

        let mut timed_out = false;
        let mut unavailable: Option<String> = None;

        while let Some((root, leaf, lookup)) = pending.next().await {
            match lookup {
                Lookup::Verified => {
                    tracing::debug!(root = %root, leaf = %leaf, "membership proof verified");
                    return Decision::Allowed(Allowance::Matched {
                        root: *root,
                        leaf: leaf.clone(),
                    });
                }
                Lookup::NotFound | Lookup::Rejected => {}
                Lookup::TimedOut => timed_out = true,
                Lookup::Unavailable(message) => {
                    unavailable.get_or_insert(message);
                }
            }
        }

        let denial = if timed_out {
            Denial::SourceTimeout
        } else if let Some(message) = unavailable {
            Denial::SourceUnavailable { message }
        } else {
            Denial::NoMatchingPattern
        };
        tracing::debug!(reason = %denial, "interaction denied");
        Decision::Denied(denial)
    }

    /// Parse and decide a raw interaction. Malformed input is denied.
    pub async fn evaluate_raw(
        &self,
        raw: &RawInteraction,
        policy: &PolicyRecord,
        now: Timestamp,
    ) -> Decision {
        match raw.to_interaction() {
            Ok(interaction) => self.evaluate(&interaction, policy, now).await,
            Err(err) => {
                tracing::debug!(error = %err, "rejecting malformed interaction");
                Decision::from(err)
            }
        }
    }

    async fn lookup<'a>(&self, root: &'a RootHash, leaf: &'a Leaf) -> (&'a RootHash, &'a Leaf, Lookup) {
        let fetch = self.source.membership_proof(root, leaf);
        let lookup = match tokio::time::timeout(self.config.proof_timeout(), fetch).await {
            Err(_) => {
                tracing::warn!(root = %root, "membership proof request timed out");
                Lookup::TimedOut
            }
            Ok(Err(ProofSourceError::NotFound { .. })) => Lookup::NotFound,
            Ok(Err(ProofSourceError::Unavailable { message })) => {
                tracing::warn!(root = %root, error = %message, "proof source unavailable");
                Lookup::Unavailable(message)
            }
            Ok(Ok(bytes)) => {
                if verify_encoded(&bytes, leaf, root, self.config.max_proof_bytes) {
                    Lookup::Verified
                } else {
                    tracing::debug!(root = %root, leaf = %leaf, "membership proof rejected");
                    Lookup::Rejected
                }
            }
        };
        (root, leaf, lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use dpf_core::{Method, Pattern};
    use dpf_trie::LeafSetStore;

    #[tokio::test]
    async fn allows_published_plain_signing() {
        let store = LeafSetStore::new();
        let root = store.publish([&Pattern::SignMessage.to_leaf()]).await;
        let policy = PolicyRecord::new(root, Timestamp::from_millis(0));
        let evaluator = PermissionEvaluator::new(store, DpfConfig::default());

        let decision = evaluator
            .evaluate(&Interaction::SignMessage, &policy, Timestamp::from_millis(1))
            .await;
        assert_matches!(decision, Decision::Allowed(Allowance::Matched { root: r, .. }) if r == root);

        let decision = evaluator
            .evaluate(&Interaction::SignData, &policy, Timestamp::from_millis(1))
            .await;
        assert_eq!(decision, Decision::Denied(Denial::NoMatchingPattern));
    }

    #[tokio::test]
    async fn raw_input_errors_are_denied() {
        let store = LeafSetStore::new();
        let root = store.publish([&Pattern::SignMessage.to_leaf()]).await;
        let policy = PolicyRecord::new(root, Timestamp::from_millis(0));
        let evaluator = PermissionEvaluator::new(store, DpfConfig::default());

        let raw = RawInteraction {
            method: Method::SendTransaction,
            details: None,
        };
        let decision = evaluator.evaluate_raw(&raw, &policy, Timestamp::from_millis(0)).await;
        assert_matches!(
            decision,
            Decision::Denied(Denial::InvalidInteraction(_))
        );
    }

    #[tokio::test]
    async fn unknown_root_denies_without_source_failure() {
        let evaluator = PermissionEvaluator::new(LeafSetStore::new(), DpfConfig::default());
        let policy = PolicyRecord::new(RootHash::new([7; 32]), Timestamp::from_millis(0));
        let decision = evaluator
            .evaluate(&Interaction::SignMessage, &policy, Timestamp::from_millis(0))
            .await;
        assert_eq!(decision, Decision::Denied(Denial::NoMatchingPattern));
    }
}
