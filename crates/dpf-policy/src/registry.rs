//! Keyed store of policy records
//!
//! One mutex per record serializes the `current -> previous` shift against
//! readers of the same domain while different domains proceed in parallel.
//! Writers lock the map before the record and keep it until the record is
//! updated, so a slot cannot be removed between lookup and write. No lock is
//! ever held across an `.await`: callers work on copied snapshots.

use dpf_core::{DomainName, RootHash, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::record::PolicyRecord;

type Slot = Arc<Mutex<PolicyRecord>>;

#[derive(Debug)]
pub struct PolicyRegistry {
    records: RwLock<HashMap<DomainName, Slot>>,
    grace_window: Duration,
}

impl PolicyRegistry {
    pub fn new(grace_window: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            grace_window,
        }
    }

    pub fn grace_window(&self) -> Duration {
        self.grace_window
    }

    fn slot(&self, domain: &DomainName) -> Option<Slot> {
        self.records.read().get(domain).cloned()
    }

    /// Apply an observed root for `domain` and return the resulting record.
    ///
    /// A corrupt existing record is replaced by a fresh one.
    pub fn ingest(&self, domain: &DomainName, root: RootHash, observed_at: Timestamp) -> PolicyRecord {
        {
            let records = self.records.read();
            if let Some(slot) = records.get(domain) {
                return Self::apply(domain, &mut slot.lock(), root, observed_at);
            }
        }

        let mut records = self.records.write();
        let slot = records
            .entry(domain.clone())
            .or_insert_with(|| Arc::new(Mutex::new(PolicyRecord::new(root, observed_at))));
        let mut record = slot.lock();
        Self::apply(domain, &mut record, root, observed_at)
    }

    fn apply(domain: &DomainName, record: &mut PolicyRecord, root: RootHash, observed_at: Timestamp) -> PolicyRecord {
        if let Err(err) = record.check_integrity() {
            tracing::warn!(domain = %domain, error = %err, "replacing corrupt policy record");
            *record = PolicyRecord::new(root, observed_at);
            return *record;
        }

        let previous = record.current_root;
        if record.rotate(root, observed_at) {
            tracing::info!(
                domain = %domain,
                previous = %previous,
                current = %root,
                at = %observed_at,
                "policy root rotated"
            );
        }
        *record
    }

    /// Install a persisted record verbatim, replacing any existing one.
    pub fn restore(&self, domain: DomainName, record: PolicyRecord) {
        self.records
            .write()
            .insert(domain, Arc::new(Mutex::new(record)));
    }

    /// Copy of the record stored for exactly `domain`.
    pub fn snapshot(&self, domain: &DomainName) -> Option<PolicyRecord> {
        self.slot(domain).map(|slot| *slot.lock())
    }

    /// Copies of every stored record.
    pub fn export(&self) -> Vec<(DomainName, PolicyRecord)> {
        let mut records: Vec<_> = self
            .records
            .read()
            .iter()
            .map(|(domain, slot)| (domain.clone(), *slot.lock()))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        records
    }

    /// The record governing `origin`: the most specific domain in its
    /// hierarchy that has an intact record.
    ///
    /// Stops at the first intact record even if it will deny. Corrupt records
    /// met on the way are removed and the walk continues upward.
    pub fn resolve(&self, origin: &DomainName) -> Option<(DomainName, PolicyRecord)> {
        for domain in origin.hierarchy() {
            let Some(slot) = self.slot(&domain) else {
                continue;
            };
            let record = *slot.lock();
            match record.check_integrity() {
                Ok(()) => return Some((domain, record)),
                Err(err) => {
                    tracing::warn!(domain = %domain, error = %err, "discarding corrupt policy record");
                    self.discard_if_corrupt(&domain, &slot);
                }
            }
        }
        None
    }

    /// Remove `slot` for `domain` unless it was replaced or repaired meanwhile.
    fn discard_if_corrupt(&self, domain: &DomainName, slot: &Slot) {
        let mut records = self.records.write();
        let still_corrupt = records
            .get(domain)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.lock().check_integrity().is_err());
        if still_corrupt {
            records.remove(domain);
        }
    }

    pub fn remove(&self, domain: &DomainName) -> Option<PolicyRecord> {
        self.records
            .write()
            .remove(domain)
            .map(|slot| *slot.lock())
    }

    /// Clear every previous root whose grace window has elapsed at `now`.
    /// Returns how many were cleared.
    pub fn sweep_expired(&self, now: Timestamp) -> usize {
        let records = self.records.read();
        let mut swept = 0;
        for (domain, slot) in records.iter() {
            if slot.lock().sweep(now, self.grace_window) {
                tracing::debug!(domain = %domain, "expired previous root");
                swept += 1;
            }
        }
        if swept > 0 {
            tracing::info!(swept, at = %now, "swept expired policy roots");
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
