//! Admission decision engine for Pod tolerations.
//!
//! The body is first split by `review` into the request envelope and the raw
//! objects. The pipeline then runs in a fixed order:
//! 1. `request`: identity and kind precondition
//! 2. `render`: decode the Pod under review
//! 3. `namespace`: classify the Pod's namespace
//! 4. `tolerations`: evaluate tolerations against the deny table
//!
//! [`decide`] composes the steps and stamps the request uid on the verdict.

pub mod namespace;
pub mod render;
pub mod request;
pub mod review;
pub mod tolerations;

pub use namespace::{
    EXCEPTION_NAMESPACE_PATTERN, NamespaceClass, NamespaceClassifier, PROTECTED_NAMESPACE_PATTERN,
    classify,
};
pub use render::{WorkloadSnapshot, render};
pub use request::{POD_KIND, validate};
pub use review::{InvalidReview, PodReview};
pub use tolerations::{
    DENYING_EFFECTS, INFRA_NODE_ROLE, MASTER_NODE_ROLE, RBAC_DEFERRED_MESSAGE,
    RBAC_DEFERRED_REASON, TaintEffect, Toleration, TolerationOperator, evaluate,
};

use tracing::debug;

use crate::error::{AdmissionError, Result};

/// Result of the toleration policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the Pod is admitted
    pub allowed: bool,
    /// Short code naming the rule that fired
    pub reason: String,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed(reason: &str, message: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a denied result
    pub fn denied(reason: &str, message: &str) -> Self {
        Self {
            allowed: false,
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}

/// Outcome of one admission request, tagged with its uid
#[derive(Debug)]
pub struct Verdict {
    /// Correlation identifier copied from the request
    pub uid: String,
    /// Policy result, or the protocol error that prevented evaluation
    pub outcome: std::result::Result<ValidationResult, AdmissionError>,
}

impl Verdict {
    /// Whether the Pod is admitted. Error verdicts are never allowed.
    pub fn allowed(&self) -> bool {
        matches!(&self.outcome, Ok(result) if result.allowed)
    }

    /// Whether evaluation failed before a policy decision was made
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Short reason code
    pub fn reason(&self) -> &str {
        match &self.outcome {
            Ok(result) => result.reason.as_str(),
            Err(e) => e.reason(),
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match &self.outcome {
            Ok(result) => result.message.clone(),
            Err(e) => e.to_string(),
        }
    }
}

/// Decide whether a Pod admission request is allowed
pub fn decide(review: &PodReview) -> Verdict {
    Verdict {
        uid: review.request.uid.clone(),
        outcome: evaluate_request(review),
    }
}

fn evaluate_request(review: &PodReview) -> Result<ValidationResult> {
    let request = &review.request;
    if let Some(problem) = request::problem(request) {
        return Err(AdmissionError::RequestMalformed(problem));
    }

    let snapshot = render(review)?;
    let class = classify(&snapshot.namespace);
    debug!(
        uid = %request.uid,
        namespace = %snapshot.namespace,
        class = %class,
        tolerations = snapshot.tolerations.len(),
        "Classified pod namespace"
    );

    Ok(evaluate(class, &snapshot.tolerations))
}
