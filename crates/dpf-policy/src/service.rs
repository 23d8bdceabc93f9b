//! Permission service
//!
//! Ties the pieces together for a wallet's approval path: resolve which
//! domain governs an origin, evaluate the interaction against that domain's
//! record, and keep records fresh from a [`RecordSource`].

use dpf_core::{DomainName, DpfConfig, Interaction, RawInteraction, RootHash, Timestamp};
use dpf_trie::ProofSource;
use std::sync::Arc;

use crate::decision::{Allowance, Decision};
use crate::dns::{select_policy_record, RecordSource};
use crate::errors::{PolicyError, PolicyResult};
use crate::evaluator::PermissionEvaluator;
use crate::record::PolicyRecord;
use crate::registry::PolicyRegistry;

pub struct PermissionService<S> {
    registry: Arc<PolicyRegistry>,
    evaluator: PermissionEvaluator<S>,
    records: Option<Arc<dyn RecordSource>>,
}

impl<S: ProofSource> PermissionService<S> {
    /// Service with an empty registry and no record source.
    pub fn new(source: S, config: DpfConfig) -> Self {
        let registry = Arc::new(PolicyRegistry::new(config.grace_window()));
        Self {
            registry,
            evaluator: PermissionEvaluator::new(source, config),
            records: None,
        }
    }

    /// Share an existing registry. Its grace window replaces the configured
    /// one for evaluation too, so sweeping never changes a decision.
    pub fn with_registry(mut self, registry: Arc<PolicyRegistry>) -> Self {
        self.evaluator = self.evaluator.with_grace_window(registry.grace_window());
        self.registry = registry;
        self
    }

    pub fn with_record_source(mut self, records: Arc<dyn RecordSource>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn registry(&self) -> &Arc<PolicyRegistry> {
        &self.registry
    }

    pub fn evaluator(&self) -> &PermissionEvaluator<S> {
        &self.evaluator
    }

    /// Decide `interaction` requested by a page served from `origin`.
    ///
    /// Origins whose hierarchy holds no record are allowed unrestricted.
    pub async fn check(&self, origin: &DomainName, interaction: &Interaction, now: Timestamp) -> Decision {
        match self.registry.resolve(origin) {
            None => {
                tracing::debug!(origin = %origin, "no policy in hierarchy");
                Decision::Allowed(Allowance::NoPolicy)
            }
            Some((governing, record)) => {
                tracing::debug!(origin = %origin, governing = %governing, "policy resolved");
                self.evaluator.evaluate(interaction, &record, now).await
            }
        }
    }

    /// Like [`check`](Self::check) for unparsed input. Malformed input is
    /// denied whether or not a policy exists.
    pub async fn check_raw(&self, origin: &DomainName, raw: &RawInteraction, now: Timestamp) -> Decision {
        match raw.to_interaction() {
            Ok(interaction) => self.check(origin, &interaction, now).await,
            Err(err) => {
                tracing::debug!(origin = %origin, error = %err, "rejecting malformed interaction");
                Decision::from(err)
            }
        }
    }

    /// Record an observed root for `domain`.
    pub fn ingest(&self, domain: &DomainName, root: RootHash, observed_at: Timestamp) -> PolicyRecord {
        self.registry.ingest(domain, root, observed_at)
    }

    pub fn sweep_expired(&self, now: Timestamp) -> usize {
        self.registry.sweep_expired(now)
    }

    /// Look up `domain`'s TXT records and ingest the announced root.
    ///
    /// A domain that publishes no policy record leaves the registry untouched
    /// and yields `Ok(None)`. More than one policy record is an error.
    pub async fn refresh(&self, domain: &DomainName, now: Timestamp) -> PolicyResult<Option<PolicyRecord>> {
        let records = self.records.as_ref().ok_or(PolicyError::NoRecordSource)?;
        let timeout = self.evaluator.config().record_timeout();

        let txts = match tokio::time::timeout(timeout, records.txt_records(domain)).await {
            Ok(result) => result.map_err(|err| {
                tracing::warn!(domain = %domain, error = %err, "record lookup failed");
                PolicyError::from(err)
            })?,
            Err(_) => {
                tracing::warn!(domain = %domain, "record lookup timed out");
                return Err(PolicyError::RecordTimeout {
                    domain: domain.clone(),
                });
            }
        };

        let Some(root) = select_policy_record(txts.iter().map(String::as_str))? else {
            tracing::debug!(domain = %domain, "no policy record published");
            return Ok(None);
        };
        Ok(Some(self.registry.ingest(domain, root, now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use dpf_core::Pattern;
    use dpf_trie::LeafSetStore;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    use crate::decision::Denial;
    use crate::errors::{RecordError, RecordSourceError};

    #[derive(Default)]
    struct StaticRecords(Mutex<HashMap<String, Vec<String>>>);

    impl StaticRecords {
        fn publish(&self, domain: &str, txt: impl Into<String>) {
            self.0.lock().entry(domain.to_string()).or_default().push(txt.into());
        }
    }

    #[async_trait]
    impl RecordSource for StaticRecords {
        async fn txt_records(&self, domain: &DomainName) -> Result<Vec<String>, RecordSourceError> {
            Ok(self.0.lock().get(domain.as_str()).cloned().unwrap_or_default())
        }
    }

    fn domain(name: &str) -> DomainName {
        DomainName::parse(name).unwrap()
    }

    #[tokio::test]
    async fn unknown_origin_is_unrestricted() {
        let service = PermissionService::new(LeafSetStore::new(), DpfConfig::default());
        let decision = service
            .check(&domain("app.example"), &Interaction::SignData, Timestamp::from_millis(0))
            .await;
        assert_eq!(decision, Decision::Allowed(Allowance::NoPolicy));
    }

    #[tokio::test]
    async fn refresh_ingests_published_root() {
        let store = LeafSetStore::new();
        let root = store.publish([&Pattern::SignMessage.to_leaf()]).await;

        let records = Arc::new(StaticRecords::default());
        records.publish("x.com", "v=spf1 -all");
        records.publish("x.com", format!("v=dpf1 {}", root.to_hex()));
        records.publish("y.com", "google-site-verification=abc");

        let service = PermissionService::new(store, DpfConfig::default())
            .with_record_source(records);
        let record = service
            .refresh(&domain("x.com"), Timestamp::from_millis(5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.current_root, root);

        assert_eq!(
            service.refresh(&domain("y.com"), Timestamp::from_millis(5)).await,
            Ok(None)
        );
        assert!(service.registry().snapshot(&domain("y.com")).is_none());

        let decision = service
            .check(&domain("www.x.com"), &Interaction::SignData, Timestamp::from_millis(6))
            .await;
        assert_eq!(decision, Decision::Denied(Denial::NoMatchingPattern));
    }

    #[tokio::test]
    async fn refresh_reports_bad_records_and_missing_source() {
        let service = PermissionService::new(LeafSetStore::new(), DpfConfig::default());
        assert_eq!(
            service.refresh(&domain("x.com"), Timestamp::from_millis(0)).await,
            Err(PolicyError::NoRecordSource)
        );

        let records = Arc::new(StaticRecords::default());
        records.publish("x.com", "v=dpf1 zz");
        let service = service.with_record_source(records);
        assert_matches!(
            service.refresh(&domain("x.com"), Timestamp::from_millis(0)).await,
            Err(PolicyError::Record(RecordError::MalformedRoot { .. }))
        );
        assert!(service.registry().is_empty());
    }

    #[tokio::test]
    async fn refresh_rejects_conflicting_records() {
        let store = LeafSetStore::new();
        let first = store.publish([&Pattern::SignMessage.to_leaf()]).await;
        let second = store.publish([&Pattern::SignData.to_leaf()]).await;

        let records = Arc::new(StaticRecords::default());
        records.publish("x.com", format!("v=dpf1 {}", first.to_hex()));
        records.publish("x.com", format!("v=dpf1 {}", second.to_hex()));

        let service = PermissionService::new(store, DpfConfig::default())
            .with_record_source(records);
        service.ingest(&domain("x.com"), first, Timestamp::from_millis(0));

        assert_eq!(
            service.refresh(&domain("x.com"), Timestamp::from_millis(5)).await,
            Err(PolicyError::Record(RecordError::Ambiguous { count: 2 }))
        );
        assert_eq!(
            service.registry().snapshot(&domain("x.com")),
            Some(PolicyRecord::new(first, Timestamp::from_millis(0)))
        );
    }

    #[tokio::test]
    async fn shared_registry_sets_the_grace_window() {
        const HOUR: Duration = Duration::from_secs(60 * 60);
        const HOUR_MS: u64 = 60 * 60 * 1000;

        let store = LeafSetStore::new();
        let old_root = store.publish([&Pattern::SignMessage.to_leaf()]).await;
        let new_root = store.publish([&Pattern::SignData.to_leaf()]).await;

        let registry = Arc::new(PolicyRegistry::new(HOUR));
        let config = DpfConfig {
            grace_window_secs: 72 * 60 * 60,
            ..DpfConfig::default()
        };
        let service = PermissionService::new(store, config).with_registry(Arc::clone(&registry));
        assert_eq!(service.evaluator().grace_window(), HOUR);

        let x = domain("x.com");
        service.ingest(&x, old_root, Timestamp::from_millis(0));
        service.ingest(&x, new_root, Timestamp::from_millis(0));

        let later = Timestamp::from_millis(2 * HOUR_MS);
        let before = service.check(&x, &Interaction::SignMessage, later).await;
        assert_eq!(service.sweep_expired(later), 1);
        let after = service.check(&x, &Interaction::SignMessage, later).await;

        assert_eq!(before, Decision::Denied(Denial::NoMatchingPattern));
        assert_eq!(before, after);
    }
}
