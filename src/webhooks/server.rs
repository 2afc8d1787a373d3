//! Admission webhook server.
//!
//! Serves the pod validation endpoint over HTTPS. The API server POSTs an
//! `AdmissionReview`; the embedded request goes through
//! [`decide`](super::policies::decide) and the verdict is returned as an
//! `AdmissionReview` response carrying the same uid.
//!
//! To enable the webhook:
//! 1. Issue a serving certificate (e.g. with cert-manager)
//! 2. Mount it at /etc/webhook/certs/ (or point WEBHOOK_CERT_PATH/WEBHOOK_KEY_PATH at it)
//! 3. Register the `ValidatingWebhookConfiguration` from
//!    [`registration`](super::registration)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::error::AdmissionError;
use crate::health::{HealthState, Outcome};
use crate::webhooks::policies::{PodReview, Verdict, decide};
use crate::webhooks::registration::WEBHOOK_PATH;

/// Shared state for webhook handlers
pub struct WebhookState {
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(health: Arc<HealthState>) -> Self {
        Self { health }
    }
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason(
    request: &AdmissionRequest<DynamicObject>,
    message: &str,
    reason: &str,
) -> AdmissionResponse {
    AdmissionResponse::from(request).deny(format!("[{}] {}", reason, message))
}

/// Translate a verdict into the admission response sent back to the API server
pub fn admission_response(
    request: &AdmissionRequest<DynamicObject>,
    verdict: &Verdict,
) -> AdmissionResponse {
    match &verdict.outcome {
        Ok(result) if result.allowed => {
            let mut response = AdmissionResponse::from(request);
            response.result.message = result.message.clone();
            response
        }
        Ok(result) => deny_with_reason(request, &result.message, &result.reason),
        Err(e) => invalid_response(&verdict.uid, e),
    }
}

/// Error response that still carries the request uid
fn invalid_response(uid: &str, error: &AdmissionError) -> AdmissionResponse {
    let mut response = AdmissionResponse::invalid(error.to_string());
    response.uid = uid.to_string();
    response.result.code = error.status_code();
    response
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(validate_pod))
        .with_state(state)
}

/// Pod validation admission handler
///
/// The body is read as raw bytes so that a malformed Pod payload is judged by
/// the decision engine instead of being rejected by the extractor.
async fn validate_pod(State(state): State<Arc<WebhookState>>, body: Bytes) -> impl IntoResponse {
    let review = match PodReview::from_slice(&body) {
        Ok(review) => review,
        Err(invalid) => {
            error!(uid = %invalid.uid, error = %invalid.error, "Failed to extract admission request");
            state
                .health
                .metrics
                .record_decision(Outcome::Errored, invalid.error.reason(), 0.0);
            return (
                StatusCode::BAD_REQUEST,
                Json(invalid_response(&invalid.uid, &invalid.error).into_review()),
            );
        }
    };

    let request = &review.request;
    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let started = Instant::now();
    let verdict = decide(&review);
    let elapsed = started.elapsed().as_secs_f64();

    let outcome = match &verdict.outcome {
        Ok(result) if result.allowed => {
            info!(uid = %uid, reason = %result.reason, "Admission request allowed");
            Outcome::Allowed
        }
        Ok(result) => {
            warn!(uid = %uid, reason = %result.reason, message = %result.message, "Admission request denied");
            Outcome::Denied
        }
        Err(e) => {
            error!(uid = %uid, reason = e.reason(), error = %e, "Admission request could not be evaluated");
            Outcome::Errored
        }
    };
    state
        .health
        .metrics
        .record_decision(outcome, verdict.reason(), elapsed);

    (
        StatusCode::OK,
        Json(admission_response(request, &verdict).into_review()),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on the configured port and serves the pod validation
/// endpoint. TLS certificates are loaded from the configured PEM files.
pub async fn run_webhook_server(
    config: &WebhookConfig,
    health: Arc<HealthState>,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;

    let state = Arc::new(WebhookState::new(health));
    let app = create_webhook_router(state);

    let tls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    info!(port = config.webhook_port, path = WEBHOOK_PATH, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
