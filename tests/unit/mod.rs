// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for pod-validation-webhook.
//!
//! These tests run without a Kubernetes cluster and drive the decision
//! engine through its public API.

#[path = "../common/mod.rs"]
mod common;

use common::fixtures::PodReviewBuilder;

const INFRA: &str = "node-role.kubernetes.io/infra";
const MASTER: &str = "node-role.kubernetes.io/master";

mod scenario_tests {
    use super::*;
    use pod_validation_webhook::decide;
    use pod_validation_webhook::error::AdmissionError;
    use pod_validation_webhook::webhooks::policies::RBAC_DEFERRED_MESSAGE;
    use serde_json::json;

    #[test]
    fn test_infra_toleration_in_kube_system_denied() {
        let review = PodReviewBuilder::new("scenario-a")
            .namespace("kube-system")
            .toleration(INFRA, "NoSchedule")
            .review();

        let verdict = decide(&review);
        assert!(!verdict.allowed());
        assert!(!verdict.is_error());
        assert_eq!(verdict.reason(), "InfraNoSchedule");
        assert!(verdict.message().contains("NoSchedule taint on infra node"));
        assert_eq!(verdict.uid, "scenario-a");
    }

    #[test]
    fn test_exception_namespace_allowed() {
        let review = PodReviewBuilder::new("scenario-b")
            .namespace("openshift-logging")
            .toleration(INFRA, "NoSchedule")
            .review();

        let verdict = decide(&review);
        assert!(verdict.allowed());
        assert_eq!(verdict.message(), RBAC_DEFERRED_MESSAGE);
    }

    #[test]
    fn test_unprotected_namespace_allowed() {
        let review = PodReviewBuilder::new("scenario-c")
            .namespace("team-app")
            .toleration(MASTER, "PreferNoSchedule")
            .review();

        assert!(decide(&review).allowed());
    }

    #[test]
    fn test_no_tolerations_allowed() {
        let review = PodReviewBuilder::new("scenario-d")
            .namespace("kube-system")
            .review();

        assert!(decide(&review).allowed());
    }

    #[test]
    fn test_empty_username_is_error() {
        let review = PodReviewBuilder::new("scenario-e")
            .namespace("kube-system")
            .username("")
            .toleration(INFRA, "NoSchedule")
            .review();

        let verdict = decide(&review);
        assert!(verdict.is_error());
        assert!(!verdict.allowed());
        assert!(matches!(
            verdict.outcome,
            Err(AdmissionError::RequestMalformed(_))
        ));
        assert_eq!(verdict.uid, "scenario-e");
    }

    #[test]
    fn test_missing_username_is_error() {
        let review = PodReviewBuilder::new("no-user").without_username().review();
        assert!(decide(&review).is_error());
    }

    #[test]
    fn test_malformed_object_is_decode_error() {
        let review = PodReviewBuilder::new("scenario-f")
            .namespace("kube-system")
            .raw_object(json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": "broken", "namespace": "kube-system" },
                "spec": { "containers": [], "tolerations": 42 }
            }))
            .review();

        let verdict = decide(&review);
        assert!(verdict.is_error());
        assert!(matches!(verdict.outcome, Err(AdmissionError::Decode(_))));
        assert!(verdict.message().starts_with("Couldn't render a Pod"));
        assert_eq!(verdict.uid, "scenario-f");
    }

    #[test]
    fn test_wrong_kind_is_error() {
        let review = PodReviewBuilder::new("wrong-kind").kind("Deployment").review();
        let verdict = decide(&review);
        assert_eq!(verdict.reason(), "RequestMalformed");
    }

    #[test]
    fn test_ill_typed_metadata_is_decode_error() {
        let review = PodReviewBuilder::new("bad-meta")
            .namespace("kube-system")
            .raw_object(json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": 5 },
                "spec": { "containers": [] }
            }))
            .review();

        let verdict = decide(&review);
        assert!(matches!(verdict.outcome, Err(AdmissionError::Decode(_))));
        assert_eq!(verdict.uid, "bad-meta");
    }

    #[test]
    fn test_wrong_kind_checked_before_decoding() {
        let review = PodReviewBuilder::new("wrong-kind-broken")
            .kind("Deployment")
            .raw_object(json!({ "metadata": { "name": 5 }, "spec": "garbage" }))
            .review();

        let verdict = decide(&review);
        assert_eq!(verdict.reason(), "RequestMalformed");
        assert!(matches!(
            verdict.outcome,
            Err(AdmissionError::RequestMalformed(_))
        ));
    }

    #[test]
    fn test_no_object_is_error() {
        let review = PodReviewBuilder::new("no-object").no_object().review();
        let verdict = decide(&review);
        assert!(matches!(verdict.outcome, Err(AdmissionError::MissingObject)));
    }

    #[test]
    fn test_update_judges_prior_state() {
        let review = PodReviewBuilder::new("update")
            .namespace("openshift-monitoring")
            .old_toleration(MASTER, "NoSchedule")
            .review();

        let verdict = decide(&review);
        assert_eq!(verdict.reason(), "MasterNoSchedule");
    }

    #[test]
    fn test_update_with_clean_prior_state_allowed() {
        let review = PodReviewBuilder::new("update-clean")
            .namespace("kube-system")
            .toleration(INFRA, "NoSchedule")
            .old_toleration("example.com/gpu", "NoSchedule")
            .review();

        assert!(decide(&review).allowed());
    }

    #[test]
    fn test_unrelated_tolerations_in_protected_namespace_allowed() {
        let review = PodReviewBuilder::new("unrelated")
            .namespace("kube-system")
            .toleration("toleration key name", "NoExecute")
            .toleration("toleration key name2", "NoSchedule")
            .review();

        assert!(decide(&review).allowed());
    }

    #[test]
    fn test_no_execute_on_master_allowed() {
        let review = PodReviewBuilder::new("no-execute")
            .namespace("default")
            .toleration(MASTER, "NoExecute")
            .review();

        assert!(decide(&review).allowed());
    }
}

mod classifier_tests {
    use pod_validation_webhook::webhooks::policies::{NamespaceClass, classify};

    #[test]
    fn test_protected() {
        assert_eq!(classify("kube-system"), NamespaceClass::Protected);
        assert_eq!(classify("openshift-ingress"), NamespaceClass::Protected);
        assert_eq!(classify("redhat-rhoam"), NamespaceClass::Protected);
        assert_eq!(classify("default"), NamespaceClass::Protected);
    }

    #[test]
    fn test_exempt() {
        assert_eq!(classify("openshift-logging"), NamespaceClass::Exempt);
        assert_eq!(classify("openshift-operators"), NamespaceClass::Exempt);
        assert_eq!(classify("team-app"), NamespaceClass::Exempt);
    }
}

mod registration_tests {
    use pod_validation_webhook::webhooks::{WEBHOOK_PATH, webhook_configuration};

    #[test]
    fn test_configuration_points_at_webhook_path() {
        let config = webhook_configuration("validation", "pod-webhook", None);
        let webhooks = config.webhooks.unwrap();
        assert_eq!(webhooks.len(), 1);

        let service = webhooks[0].client_config.service.clone().unwrap();
        assert_eq!(service.name, "pod-webhook");
        assert_eq!(service.path.as_deref(), Some(WEBHOOK_PATH));
        assert_eq!(webhooks[0].failure_policy.as_deref(), Some("Ignore"));
    }
}
