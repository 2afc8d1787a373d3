//! Registration metadata for the pod validation webhook.
//!
//! Everything here is static: it describes how the API server should call
//! the webhook and is never consulted while deciding a request.

use k8s_openapi::ByteString;
use k8s_openapi::api::admissionregistration::v1::{
    RuleWithOperations, ServiceReference, ValidatingWebhook, ValidatingWebhookConfiguration,
    WebhookClientConfig,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Webhook name, also the last path segment it is served under
pub const WEBHOOK_NAME: &str = "pod-validation";
/// HTTP path of the validation endpoint
pub const WEBHOOK_PATH: &str = "/pod-validation";
/// Fully qualified name used in the `ValidatingWebhookConfiguration`
pub const WEBHOOK_QUALIFIED_NAME: &str = "pod-validation.managed.openshift.io";
/// Time the API server waits for a verdict
pub const TIMEOUT_SECONDS: i32 = 1;
/// Fail open: if the webhook is unreachable, RBAC alone decides
pub const FAILURE_POLICY: &str = "Ignore";
pub const MATCH_POLICY: &str = "Equivalent";
pub const SIDE_EFFECTS: &str = "None";
/// AdmissionReview versions the server answers in
pub const ADMISSION_REVIEW_VERSIONS: [&str; 1] = ["v1"];

/// Rules matching every operation on core-group pods
pub fn rules() -> Vec<RuleWithOperations> {
    vec![RuleWithOperations {
        operations: Some(vec!["*".to_string()]),
        api_groups: Some(vec![String::new()]),
        api_versions: Some(vec!["*".to_string()]),
        resources: Some(vec!["pods".to_string()]),
        scope: Some("Namespaced".to_string()),
    }]
}

/// Build the webhook entry pointing at an in-cluster service
pub fn validating_webhook(
    service_namespace: &str,
    service_name: &str,
    ca_bundle: Option<Vec<u8>>,
) -> ValidatingWebhook {
    ValidatingWebhook {
        name: WEBHOOK_QUALIFIED_NAME.to_string(),
        admission_review_versions: ADMISSION_REVIEW_VERSIONS
            .iter()
            .map(|v| v.to_string())
            .collect(),
        client_config: WebhookClientConfig {
            ca_bundle: ca_bundle.map(ByteString),
            service: Some(ServiceReference {
                namespace: service_namespace.to_string(),
                name: service_name.to_string(),
                path: Some(WEBHOOK_PATH.to_string()),
                port: None,
            }),
            url: None,
        },
        failure_policy: Some(FAILURE_POLICY.to_string()),
        match_policy: Some(MATCH_POLICY.to_string()),
        rules: Some(rules()),
        side_effects: SIDE_EFFECTS.to_string(),
        timeout_seconds: Some(TIMEOUT_SECONDS),
        ..Default::default()
    }
}

/// Wrap the webhook in a `ValidatingWebhookConfiguration`
pub fn webhook_configuration(
    service_namespace: &str,
    service_name: &str,
    ca_bundle: Option<Vec<u8>>,
) -> ValidatingWebhookConfiguration {
    ValidatingWebhookConfiguration {
        metadata: ObjectMeta {
            name: Some(WEBHOOK_QUALIFIED_NAME.to_string()),
            ..Default::default()
        },
        webhooks: Some(vec![validating_webhook(
            service_namespace,
            service_name,
            ca_bundle,
        )]),
        ..Default::default()
    }
}
