//! Validating admission webhook for Pods.
//!
//! - `policies`: the decision engine (request check, rendering, namespace
//!   classification, toleration policy)
//! - `server`: HTTPS transport
//! - `registration`: static `ValidatingWebhookConfiguration` metadata

pub mod policies;
pub mod registration;
mod server;

pub use policies::{InvalidReview, PodReview, ValidationResult, Verdict, decide};
pub use registration::{WEBHOOK_NAME, WEBHOOK_PATH, webhook_configuration};
pub use server::{
    WebhookError, WebhookState, admission_response, create_webhook_router, run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
