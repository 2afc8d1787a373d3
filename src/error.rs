//! Error types for the admission pipeline.
//!
//! These are protocol errors, not policy outcomes. A policy denial is a
//! normal [`ValidationResult`](crate::webhooks::ValidationResult) with
//! `allowed == false` and never appears here.

use thiserror::Error;

/// HTTP status carried in the admission response for every error verdict
pub const BAD_REQUEST: u16 = 400;

/// Error type for a single admission decision
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// Body is not an `AdmissionReview` carrying a request
    #[error("Invalid AdmissionReview: {0}")]
    InvalidReview(String),

    /// Request is missing its identity or targets an unexpected kind
    #[error("Malformed admission request: {0}")]
    RequestMalformed(String),

    /// Neither the old nor the new object was sent
    #[error("Admission request carries no object to evaluate")]
    MissingObject,

    /// Object payload could not be decoded into a Pod
    #[error("Couldn't render a Pod from the incoming request: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AdmissionError {
    /// Status code reported back to the API server
    pub fn status_code(&self) -> u16 {
        match self {
            AdmissionError::InvalidReview(_)
            | AdmissionError::RequestMalformed(_)
            | AdmissionError::MissingObject
            | AdmissionError::Decode(_) => BAD_REQUEST,
        }
    }

    /// Short machine-readable reason, used for metrics and log fields
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::InvalidReview(_) => "InvalidAdmissionReview",
            AdmissionError::RequestMalformed(_) => "RequestMalformed",
            AdmissionError::MissingObject => "MissingObject",
            AdmissionError::Decode(_) => "DecodeError",
        }
    }
}

/// Result type alias for the admission pipeline
pub type Result<T> = std::result::Result<T, AdmissionError>;
