// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for pod-validation-webhook.
//!
//! Uses proptest to generate random namespaces and toleration lists and
//! verify the policy invariants.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use common::fixtures::PodReviewBuilder;
use pod_validation_webhook::decide;
use pod_validation_webhook::webhooks::policies::{
    INFRA_NODE_ROLE, MASTER_NODE_ROLE, NamespaceClass, TaintEffect, Toleration, classify, evaluate,
};

/// Strategy for namespaces in the protected families (never exception matches).
fn protected_namespace() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("kube".to_string()),
        Just("openshift".to_string()),
        Just("default".to_string()),
        "[a-z]{1,12}".prop_map(|s| format!("kube-{s}")),
        "[a-z]{1,12}".prop_map(|s| format!("redhat-{s}")),
        "[a-z]{1,12}"
            .prop_filter("exception names", |s| !s.contains("logging") && !s.contains("operators"))
            .prop_map(|s| format!("openshift-{s}")),
    ]
}

/// Strategy for namespaces outside every protected family.
fn unprotected_namespace() -> impl Strategy<Value = String> {
    "team-[a-z0-9]{1,16}"
}

/// Strategy for any namespace-like string.
fn any_namespace() -> impl Strategy<Value = String> {
    prop_oneof![
        protected_namespace(),
        unprotected_namespace(),
        Just("openshift-logging".to_string()),
        Just("openshift-operators".to_string()),
        "[a-z][a-z0-9-]{0,30}",
    ]
}

fn any_effect() -> impl Strategy<Value = Option<TaintEffect>> {
    prop_oneof![
        Just(None),
        Just(Some(TaintEffect::NoSchedule)),
        Just(Some(TaintEffect::PreferNoSchedule)),
        Just(Some(TaintEffect::NoExecute)),
    ]
}

fn any_key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(INFRA_NODE_ROLE.to_string()),
        Just(MASTER_NODE_ROLE.to_string()),
        Just("node-role.kubernetes.io/worker".to_string()),
        "[a-z./-]{1,24}",
    ]
}

fn any_toleration() -> impl Strategy<Value = Toleration> {
    (any_key(), any_effect()).prop_map(|(key, effect)| Toleration::new(key, effect))
}

fn is_denying(t: &Toleration) -> bool {
    (t.key == INFRA_NODE_ROLE || t.key == MASTER_NODE_ROLE)
        && matches!(
            t.effect,
            Some(TaintEffect::NoSchedule | TaintEffect::PreferNoSchedule)
        )
}

proptest! {
    /// Property: the protected families classify as Protected.
    #[test]
    fn prop_protected_namespaces_classified(ns in protected_namespace()) {
        prop_assert_eq!(classify(&ns), NamespaceClass::Protected);
    }

    /// Property: names outside the protected families are Exempt.
    #[test]
    fn prop_unprotected_namespaces_exempt(ns in unprotected_namespace()) {
        prop_assert_eq!(classify(&ns), NamespaceClass::Exempt);
    }

    /// Property: anything containing an exception name is Exempt.
    #[test]
    fn prop_exception_always_wins(
        prefix in prop_oneof![Just(""), Just("kube-"), Just("openshift-"), Just("redhat-")],
        exception in prop_oneof![Just("openshift-logging"), Just("openshift-operators")],
        suffix in "[a-z-]{0,8}",
    ) {
        let ns = format!("{prefix}{exception}{suffix}");
        prop_assert_eq!(classify(&ns), NamespaceClass::Exempt);
    }

    /// Property: Exempt namespaces always allow, whatever the tolerations.
    #[test]
    fn prop_exempt_always_allows(tolerations in prop::collection::vec(any_toleration(), 0..8)) {
        prop_assert!(evaluate(NamespaceClass::Exempt, &tolerations).allowed);
    }

    /// Property: in a Protected namespace the verdict is deny iff some
    /// toleration hits the deny table, and the first hit names the reason.
    #[test]
    fn prop_protected_denies_exactly_on_table_hit(
        tolerations in prop::collection::vec(any_toleration(), 0..8),
    ) {
        let result = evaluate(NamespaceClass::Protected, &tolerations);
        match tolerations.iter().find(|t| is_denying(t)) {
            Some(first) => {
                prop_assert!(!result.allowed);
                let family = if first.key == INFRA_NODE_ROLE { "infra" } else { "master" };
                let expected = format!("{} taint on {} node", first.effect.unwrap(), family);
                prop_assert!(result.message.ends_with(&expected), "{}", result.message);
            }
            None => prop_assert!(result.allowed),
        }
    }

    /// Property: evaluation has no hidden state.
    #[test]
    fn prop_evaluation_is_idempotent(
        protected in any::<bool>(),
        tolerations in prop::collection::vec(any_toleration(), 0..8),
    ) {
        let class = if protected { NamespaceClass::Protected } else { NamespaceClass::Exempt };
        let first = evaluate(class, &tolerations);
        let second = evaluate(class, &tolerations);
        prop_assert_eq!(first, second);
    }

    /// Property: the verdict uid equals the request uid on every path.
    #[test]
    fn prop_uid_is_preserved(
        uid in "[a-f0-9-]{1,36}",
        ns in any_namespace(),
        username in prop_oneof![Just(String::new()), "[a-z]{1,10}"],
        kind in prop_oneof![Just("Pod"), Just("Deployment")],
        infra in any::<bool>(),
    ) {
        let mut builder = PodReviewBuilder::new(uid.clone())
            .namespace(ns)
            .username(username)
            .kind(kind);
        if infra {
            builder = builder.toleration(INFRA_NODE_ROLE, "NoSchedule");
        }

        let verdict = decide(&builder.review());
        prop_assert_eq!(verdict.uid, uid);
    }
}
