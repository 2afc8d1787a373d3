//! pod-validation-webhook library crate
//!
//! Exports the admission decision engine, the HTTPS webhook server, the
//! health/metrics server and the process configuration.

pub mod config;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::{ConfigError, WebhookConfig};
pub use error::AdmissionError;
pub use health::HealthState;
pub use webhooks::{PodReview, Verdict, WebhookError, decide, run_webhook_server};
