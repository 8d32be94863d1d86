//! Integration tests for distribution creation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use distribution_core::model::{ActivityKind, DeliveryTracking, DistributionRequest};
use distribution_core::{
    DistributionHandler, FixedClock, RequestError, SequentialIdGenerator, SystemClock, UlidIdGenerator,
    UnknownScopePolicy, ValidationMode, ValidationPolicy,
};
use serde_json::json;

fn fixed_handler(policy: ValidationPolicy) -> DistributionHandler {
    let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
    DistributionHandler::new(Arc::new(SequentialIdGenerator::new()), Arc::new(FixedClock(at)), policy)
}

fn request(case_id: &str, scope: Option<&str>, attachments: &[&str]) -> DistributionRequest {
    DistributionRequest::new(case_id, scope, attachments.iter().map(|a| json!(a)).collect())
}

#[test]
fn all_states_addresses_191_recipients() {
    let out = fixed_handler(ValidationPolicy::default())
        .create(request("C-1", Some("All States"), &["a1"]))
        .unwrap();

    assert_eq!(out.distribution.recipient_count, 191);
    assert_eq!(
        out.distribution.delivery_tracking,
        DeliveryTracking {
            delivered: 0,
            pending: 191,
            failed: 0
        }
    );
    assert_eq!(out.activity.subtitle, "191 recipients");
}

#[test]
fn selected_addresses_25_recipients() {
    let out = fixed_handler(ValidationPolicy::default())
        .create(request("C-2", Some("Selected"), &[]))
        .unwrap();

    assert_eq!(out.distribution.recipient_count, 25);
    assert_eq!(out.activity.subtitle, "25 recipients");
}

#[test]
fn other_scopes_fall_into_default_tier() {
    let handler = fixed_handler(ValidationPolicy::default());
    for scope in [Some("Limited"), Some(""), Some("all states"), None] {
        let out = handler.create(request("C-3", scope, &["a1", "a2"])).unwrap();
        assert_eq!(out.distribution.recipient_count, 15, "scope {scope:?}");
        assert_eq!(out.activity.subtitle, "15 recipients");
        assert_eq!(out.distribution.delivery_tracking.pending, 15);
    }
}

#[test]
fn records_carry_fixed_labels_and_shared_timestamp() {
    let out = fixed_handler(ValidationPolicy::default())
        .create(request("C-1", Some("Selected"), &[]))
        .unwrap();

    assert_eq!(out.distribution.id, "dist-1");
    assert_eq!(out.activity.id, "act-2");
    assert_eq!(out.distribution.title, "New distribution");
    assert_eq!(out.activity.title, "Distribution created");
    assert_eq!(out.activity.icon, "Send");
    assert_eq!(out.activity.kind, ActivityKind::Distribution);
    assert_eq!(out.distribution.date, out.activity.timestamp);
}

#[test]
fn scope_and_attachments_are_echoed() {
    let req = DistributionRequest::new(
        "C-9",
        Some("Limited"),
        vec![json!("a1"), json!({"name": "brief.pdf", "pages": 3})],
    );
    let out = fixed_handler(ValidationPolicy::default()).create(req.clone()).unwrap();

    assert_eq!(out.distribution.scope, req.scope);
    assert_eq!(out.distribution.attachments, req.attachments);
}

#[test]
fn repeated_calls_differ_only_in_ids_and_time() {
    let handler = DistributionHandler::new(
        Arc::new(UlidIdGenerator::new()),
        Arc::new(SystemClock),
        ValidationPolicy::default(),
    );

    let mut ids = HashSet::new();
    let first = handler.create(request("C-1", Some("All States"), &["a1"])).unwrap();
    for _ in 0..200 {
        let out = handler.create(request("C-1", Some("All States"), &["a1"])).unwrap();
        assert!(ids.insert(out.distribution.id.clone()));
        assert!(ids.insert(out.activity.id.clone()));

        assert_eq!(out.distribution.recipient_count, first.distribution.recipient_count);
        assert_eq!(out.distribution.delivery_tracking, first.distribution.delivery_tracking);
        assert_eq!(out.activity.subtitle, first.activity.subtitle);
    }
    assert!(!ids.contains(&first.distribution.id));
}

#[test]
fn create_from_json_relaxed_defaults_missing_scope() {
    let out = fixed_handler(ValidationPolicy::default())
        .create_from_json(&json!({"caseId": "C-4", "attachments": []}))
        .unwrap();

    assert_eq!(out.distribution.recipient_count, 15);
    assert_eq!(out.distribution.scope, None);
    assert_eq!(out.distribution.attachments, Some(json!([])));
}

#[test]
fn create_from_json_relaxed_echoes_odd_shapes_untouched() {
    let handler = fixed_handler(ValidationPolicy::default());

    let out = handler
        .create_from_json(&json!({"caseId": "C", "scope": null, "attachments": "x"}))
        .unwrap();
    let wire = serde_json::to_value(&out.distribution).unwrap();
    assert_eq!(wire["scope"], json!(null));
    assert!(wire.as_object().unwrap().contains_key("scope"));
    assert_eq!(wire["attachments"], json!("x"));
    assert_eq!(out.distribution.recipient_count, 15);

    let out = handler.create_from_json(&json!({"caseId": "C", "scope": 7})).unwrap();
    let wire = serde_json::to_value(&out.distribution).unwrap();
    assert_eq!(wire["scope"], json!(7));
    assert!(!wire.as_object().unwrap().contains_key("attachments"));
    assert_eq!(out.distribution.recipient_count, 15);
}

#[test]
fn create_from_json_strict_rejects_missing_scope() {
    let err = fixed_handler(ValidationPolicy::strict())
        .create_from_json(&json!({"caseId": "C-4", "attachments": []}))
        .unwrap_err();

    assert!(matches!(err, RequestError::MalformedRequest(_)));
}

#[test]
fn reject_policy_applies_to_typed_requests() {
    let handler = fixed_handler(ValidationPolicy {
        mode: ValidationMode::Relaxed,
        unknown_scope: UnknownScopePolicy::Reject,
    });

    let err = handler.create(request("C-3", Some("Limited"), &[])).unwrap_err();
    assert_eq!(err, RequestError::UnknownScope("Limited".into()));
    assert!(handler.create(request("C-1", Some("All States"), &[])).is_ok());
}

#[test]
fn create_from_json_applies_unknown_scope_policy() {
    let handler = fixed_handler(ValidationPolicy {
        mode: ValidationMode::Strict,
        unknown_scope: UnknownScopePolicy::Reject,
    });
    assert_eq!(handler.policy().unknown_scope, UnknownScopePolicy::Reject);

    let err = handler
        .create_from_json(&json!({"caseId": "C-3", "scope": "Limited", "attachments": []}))
        .unwrap_err();
    assert_eq!(err, RequestError::UnknownScope("Limited".into()));

    let out = handler
        .create_from_json(&json!({"caseId": "C-2", "scope": "Selected", "attachments": []}))
        .unwrap();
    assert_eq!(out.distribution.recipient_count, 25);
}
