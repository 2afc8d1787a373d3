//! Rendering the Pod under review from an admission request.
//!
//! The prior state (`oldObject`) is judged when it is present and non-empty,
//! otherwise the incoming state (`object`). Decoding happens per call from the
//! request's own payload, so concurrent requests share nothing.

use k8s_openapi::Resource as _;
use k8s_openapi::api::core::v1::Pod;
use serde_json::Value;

use super::review::PodReview;
use super::tolerations::Toleration;
use crate::error::{AdmissionError, Result};

/// The decision-relevant subset of a Pod
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkloadSnapshot {
    /// Namespace the Pod lives in
    pub namespace: String,
    /// Pod tolerations, in declaration order
    pub tolerations: Vec<Toleration>,
}

impl WorkloadSnapshot {
    /// Project a Pod onto its namespace and tolerations.
    ///
    /// CREATE requests often omit `metadata.namespace` on the object itself,
    /// so the request namespace is used as a fallback.
    pub fn from_pod(pod: &Pod, request_namespace: Option<&str>) -> Self {
        let namespace = pod
            .metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .or(request_namespace)
            .unwrap_or_default()
            .to_string();

        let tolerations = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.tolerations.as_ref())
            .map(|list| list.iter().map(Toleration::from).collect())
            .unwrap_or_default();

        Self {
            namespace,
            tolerations,
        }
    }
}

/// Whether an embedded object actually carries content beyond its type meta
fn is_populated(object: &Value) -> bool {
    match object {
        Value::Null => false,
        Value::Object(fields) => fields
            .iter()
            .any(|(name, value)| name != "apiVersion" && name != "kind" && !is_empty(value)),
        _ => true,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Decode an embedded object into a Pod
fn decode_pod(object: &Value) -> Result<Pod> {
    let mut value = object.clone();
    // Raw objects in admission requests may omit their type meta
    if let Value::Object(fields) = &mut value {
        fields
            .entry("apiVersion")
            .or_insert_with(|| Value::from(Pod::API_VERSION));
        fields
            .entry("kind")
            .or_insert_with(|| Value::from(Pod::KIND));
    }
    Ok(serde_json::from_value(value)?)
}

/// Select and decode the object under review
pub fn render(review: &PodReview) -> Result<WorkloadSnapshot> {
    let object = review
        .old_object
        .as_ref()
        .filter(|old| is_populated(old))
        .or(review.object.as_ref())
        .ok_or(AdmissionError::MissingObject)?;

    let pod = decode_pod(object)?;
    Ok(WorkloadSnapshot::from_pod(
        &pod,
        review.request.namespace.as_deref(),
    ))
}
