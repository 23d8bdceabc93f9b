//! Time-locked policy records
//!
//! A domain's record tracks the root it currently publishes and, for a grace
//! window after a change, the root it published before. Both are
//! authoritative during the window so that a freshly published (or hijacked)
//! record cannot silently revoke what users already rely on.

use dpf_core::config::DEFAULT_GRACE_WINDOW_SECS;
use dpf_core::{RootHash, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::PolicyError;

/// Default period during which a replaced root stays authoritative.
pub const GRACE_WINDOW: Duration = Duration::from_secs(DEFAULT_GRACE_WINDOW_SECS);

/// Per-domain policy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    pub current_root: RootHash,
    pub previous_root: Option<RootHash>,
    pub root_changed_at: Option<Timestamp>,
}

impl PolicyRecord {
    /// First observation of a domain's root.
    pub fn new(root: RootHash, observed_at: Timestamp) -> Self {
        Self {
            current_root: root,
            previous_root: None,
            root_changed_at: Some(observed_at),
        }
    }

    pub fn check_integrity(&self) -> Result<(), PolicyError> {
        match (self.previous_root, self.root_changed_at) {
            (Some(_), None) => Err(PolicyError::Corrupt {
                reason: "previous root without change timestamp",
            }),
            (Some(previous), Some(_)) if previous == self.current_root => {
                Err(PolicyError::Corrupt {
                    reason: "previous root equals current root",
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether `now` falls inside the grace window opened by the last change.
    ///
    /// A change timestamp in the future counts as inside the window.
    pub fn in_grace_window(&self, now: Timestamp, grace: Duration) -> bool {
        self.root_changed_at
            .is_some_and(|changed| now.saturating_since(changed) < grace)
    }

    /// Roots to consult at `now`, current root first.
    pub fn authoritative_roots(&self, now: Timestamp, grace: Duration) -> Vec<RootHash> {
        let mut roots = vec![self.current_root];
        if let Some(previous) = self.previous_root {
            if self.in_grace_window(now, grace) {
                roots.push(previous);
            }
        }
        roots
    }

    /// Install `root` observed at `observed_at`.
    ///
    /// Returns `false` and leaves the record untouched when `root` is already
    /// current.
    pub fn rotate(&mut self, root: RootHash, observed_at: Timestamp) -> bool {
        if root == self.current_root {
            return false;
        }
        self.previous_root = Some(self.current_root);
        self.current_root = root;
        self.root_changed_at = Some(observed_at);
        true
    }

    /// Drop a previous root whose window has elapsed. Returns whether one was
    /// dropped.
    pub fn sweep(&mut self, now: Timestamp, grace: Duration) -> bool {
        if self.previous_root.is_some() && !self.in_grace_window(now, grace) {
            self.previous_root = None;
            return true;
        }
        false
    }
}
