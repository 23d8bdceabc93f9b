//! End-to-end evaluation scenarios
//!
//! Publisher builds and serves a trie, the registry tracks the announced
//! roots, and the service decides requests from an origin.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use dpf_core::{Interaction, Pattern, RawInteraction, Selector};
use dpf_policy::{
    Allowance, Decision, Denial, PermissionEvaluator, PermissionService, PolicyRecord,
};
use dpf_testkit::*;
use dpf_trie::LeafSetStore;
use std::sync::Arc;

async fn published(patterns: &[Pattern]) -> (Arc<ScriptedSource>, dpf_core::RootHash) {
    let store = LeafSetStore::new();
    let root = store.publish(&leaves_of(patterns)).await;
    (Arc::new(ScriptedSource::new(store)), root)
}

#[tokio::test]
async fn opensea_exact_tuple_allowed_other_selector_denied() {
    init_test_tracing();
    let (source, root) = published(&[seaport_plain_pattern()]).await;
    let service = PermissionService::new(source, test_config());
    let opensea = domain("opensea.io");
    service.ingest(&opensea, root, at_ms(0));

    let denied = service
        .check(&opensea, &seaport_call(Selector::Function(FULFILL_SELECTOR)), at_ms(1))
        .await;
    assert_eq!(denied, Decision::Denied(Denial::NoMatchingPattern));

    let allowed = service
        .check(&opensea, &seaport_call(Selector::Empty), at_ms(1))
        .await;
    assert_eq!(
        allowed,
        Decision::Allowed(Allowance::Matched {
            root,
            leaf: seaport_leaf(),
        })
    );
}

#[tokio::test]
async fn wildcard_pattern_covers_every_selector() {
    let (source, root) = published(&[seaport_any_call_pattern()]).await;
    let service = PermissionService::new(source, test_config());
    let opensea = domain("opensea.io");
    service.ingest(&opensea, root, at_ms(0));

    for selector in [Selector::Empty, Selector::Function(FULFILL_SELECTOR)] {
        let decision = service.check(&opensea, &seaport_call(selector), at_ms(1)).await;
        assert_matches!(
            decision,
            Decision::Allowed(Allowance::Matched { leaf, .. }) if leaf == seaport_any_call_pattern().to_leaf()
        );
    }
}

#[tokio::test]
async fn origin_without_records_is_unrestricted() {
    let (source, root) = published(&[Pattern::SignMessage]).await;
    let service = PermissionService::new(source, test_config());
    service.ingest(&domain("opensea.io"), root, at_ms(0));

    let decision = service
        .check(&domain("app.uniswap.org"), &typed_data(1, 2), at_ms(0))
        .await;
    assert_eq!(decision, Decision::Allowed(Allowance::NoPolicy));
}

#[tokio::test]
async fn grace_window_keeps_previous_root_authoritative() {
    let store = LeafSetStore::new();
    let root_a = store.publish(&leaves_of(&[Pattern::SignMessage])).await;
    let root_b = store.publish(&leaves_of(&[Pattern::SignData])).await;
    let service = PermissionService::new(Arc::new(ScriptedSource::new(store)), test_config());
    let x = domain("x.com");

    service.ingest(&x, root_a, at_ms(0));
    let record = service.ingest(&x, root_b, at_ms(100));
    assert_eq!(
        record,
        PolicyRecord {
            current_root: root_b,
            previous_root: Some(root_a),
            root_changed_at: Some(at_ms(100)),
        }
    );

    // Only root A admits SignMessage
    let during = service
        .check(&x, &Interaction::SignMessage, at_ms(100 + 71 * HOUR_MS))
        .await;
    assert_matches!(during, Decision::Allowed(Allowance::Matched { root, .. }) if root == root_a);

    let after = service
        .check(&x, &Interaction::SignMessage, at_ms(100 + 73 * HOUR_MS))
        .await;
    assert_eq!(after, Decision::Denied(Denial::NoMatchingPattern));

    let current = service
        .check(&x, &Interaction::SignData, at_ms(100 + 73 * HOUR_MS))
        .await;
    assert_matches!(current, Decision::Allowed(Allowance::Matched { root, .. }) if root == root_b);
}

#[tokio::test]
async fn grace_window_boundary() {
    let store = LeafSetStore::new();
    let previous = store.publish(&leaves_of(&[Pattern::SignMessage])).await;
    let current = store.publish(&leaves_of(&[Pattern::SignData])).await;
    let evaluator = PermissionEvaluator::new(ScriptedSource::new(store), test_config());

    let t = 1_700_000_000_000;
    let mut record = PolicyRecord::new(previous, at_ms(0));
    record.rotate(current, at_ms(t));

    let inside = at_ms(t + 71 * HOUR_MS + 59 * MINUTE_MS);
    let outside = at_ms(t + 72 * HOUR_MS + 1_000);
    assert!(evaluator
        .evaluate(&Interaction::SignMessage, &record, inside)
        .await
        .is_allowed());
    assert_eq!(
        evaluator
            .evaluate(&Interaction::SignMessage, &record, outside)
            .await,
        Decision::Denied(Denial::NoMatchingPattern)
    );
}

#[tokio::test]
async fn hierarchy_stops_at_first_record_even_when_it_denies() {
    let store = LeafSetStore::new();
    let permissive = store
        .publish(&leaves_of(&[Pattern::SignMessage, Pattern::SignData]))
        .await;
    let strict = store.publish(&leaves_of(&[Pattern::SignData])).await;
    let service = PermissionService::new(Arc::new(ScriptedSource::new(store)), test_config());

    service.ingest(&domain("example.com"), permissive, at_ms(0));
    service.ingest(&domain("sub.example.com"), strict, at_ms(0));

    let nested = service
        .check(&domain("deep.sub.example.com"), &Interaction::SignMessage, at_ms(1))
        .await;
    assert_eq!(nested, Decision::Denied(Denial::NoMatchingPattern));

    let sibling = service
        .check(&domain("other.example.com"), &Interaction::SignMessage, at_ms(1))
        .await;
    assert!(sibling.is_allowed());
}

#[tokio::test]
async fn corrupt_record_falls_back_up_the_hierarchy() {
    init_test_tracing();
    let (source, root) = published(&[Pattern::SignData]).await;
    let service = PermissionService::new(source, test_config());

    service.registry().restore(
        domain("sub.example.com"),
        PolicyRecord {
            current_root: fake_root(1),
            previous_root: Some(fake_root(2)),
            root_changed_at: None,
        },
    );
    let origin = domain("sub.example.com");
    assert_eq!(
        service.check(&origin, &Interaction::SignData, at_ms(0)).await,
        Decision::Allowed(Allowance::NoPolicy)
    );

    service.registry().restore(
        origin.clone(),
        PolicyRecord {
            current_root: fake_root(1),
            previous_root: Some(fake_root(1)),
            root_changed_at: Some(at_ms(0)),
        },
    );
    service.ingest(&domain("example.com"), root, at_ms(0));
    assert_matches!(
        service.check(&origin, &Interaction::SignData, at_ms(0)).await,
        Decision::Allowed(Allowance::Matched { root: r, .. }) if r == root
    );
    assert!(service.registry().snapshot(&origin).is_none());
}

#[tokio::test]
async fn stalled_source_is_undeterminable() {
    init_test_tracing();
    let (source, root) = published(&[Pattern::SignMessage]).await;
    source.script(root, Scripted::Stall);
    let evaluator = PermissionEvaluator::new(Arc::clone(&source), test_config());
    let record = PolicyRecord::new(root, at_ms(0));

    let decision = evaluator
        .evaluate(&Interaction::SignMessage, &record, at_ms(0))
        .await;
    assert_eq!(decision, Decision::Denied(Denial::SourceTimeout));
    assert!(decision.denial().unwrap().is_undeterminable());
}

#[tokio::test]
async fn unavailable_source_is_reported() {
    let (source, root) = published(&[Pattern::SignMessage]).await;
    source.script(root, Scripted::Fail("connection refused".into()));
    let evaluator = PermissionEvaluator::new(Arc::clone(&source), test_config());
    let record = PolicyRecord::new(root, at_ms(0));

    let decision = evaluator
        .evaluate(&seaport_call(Selector::Empty), &record, at_ms(0))
        .await;
    assert_eq!(
        decision,
        Decision::Denied(Denial::SourceUnavailable {
            message: "connection refused".into()
        })
    );
    assert_eq!(source.requests(), 16);
}

#[tokio::test]
async fn one_verified_lookup_wins_over_stalled_root() {
    let store = LeafSetStore::new();
    let previous = store.publish(&leaves_of(&[Pattern::SignMessage])).await;
    let current = store.publish(&leaves_of(&[Pattern::SignData])).await;
    let source = Arc::new(ScriptedSource::new(store));
    source.script(current, Scripted::Stall);
    let evaluator = PermissionEvaluator::new(Arc::clone(&source), test_config());

    let mut record = PolicyRecord::new(previous, at_ms(0));
    record.rotate(current, at_ms(0));

    let decision = evaluator
        .evaluate(&Interaction::SignMessage, &record, at_ms(1))
        .await;
    assert_matches!(decision, Decision::Allowed(Allowance::Matched { root, .. }) if root == previous);
}

#[tokio::test]
async fn forged_proofs_never_allow() {
    let (source, root) = published(&[Pattern::SignData, seaport_plain_pattern()]).await;
    let evaluator = PermissionEvaluator::new(Arc::clone(&source), test_config());
    let record = PolicyRecord::new(root, at_ms(0));

    source.script(root, Scripted::WrongLeaf(Pattern::SignData.to_leaf()));
    assert_eq!(
        evaluator
            .evaluate(&Interaction::SignMessage, &record, at_ms(0))
            .await,
        Decision::Denied(Denial::NoMatchingPattern)
    );

    source.script(root, Scripted::Garbage(vec![0xff; 4096]));
    assert_eq!(
        evaluator
            .evaluate(&seaport_call(Selector::Empty), &record, at_ms(0))
            .await,
        Decision::Denied(Denial::NoMatchingPattern)
    );
}

#[tokio::test]
async fn malformed_raw_request_is_denied_even_without_policy() {
    let service = PermissionService::new(LeafSetStore::new(), test_config());
    let raw: RawInteraction = serde_json::from_str(
        r#"{"method":"SendTransaction","details":{"chainId":"1","toAddress":"0x1234","value":"0"}}"#,
    )
    .unwrap();
    let decision = service.check_raw(&domain("nowhere.test"), &raw, at_ms(0)).await;
    assert_matches!(decision, Decision::Denied(Denial::InvalidInteraction(_)));
}

#[tokio::test]
async fn sweep_does_not_change_decisions() {
    let store = LeafSetStore::new();
    let root_a = store.publish(&leaves_of(&[Pattern::SignMessage])).await;
    let root_b = store.publish(&leaves_of(&[Pattern::SignData])).await;
    let service = PermissionService::new(Arc::new(ScriptedSource::new(store)), test_config());
    let x = domain("x.com");
    service.ingest(&x, root_a, at_ms(0));
    service.ingest(&x, root_b, at_ms(0));

    let late = at_ms(80 * HOUR_MS);
    let before = service.check(&x, &Interaction::SignMessage, late).await;
    assert_eq!(service.sweep_expired(late), 1);
    let after = service.check(&x, &Interaction::SignMessage, late).await;
    assert_eq!(before, after);
    assert!(after.is_denied());
}
