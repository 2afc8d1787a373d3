//! Structural precondition on incoming admission requests.
//!
//! A request without a username cannot be attributed, and a request for any
//! kind other than Pod means the webhook is registered against the wrong
//! resource. Both are rejected before any decoding.

use kube::core::DynamicObject;
use kube::core::admission::AdmissionRequest;

/// The only kind this webhook evaluates
pub const POD_KIND: &str = "Pod";

/// Check the request identity and target kind
pub fn validate(request: &AdmissionRequest<DynamicObject>) -> bool {
    problem(request).is_none()
}

/// Describe why a request fails [`validate`], if it does
pub fn problem(request: &AdmissionRequest<DynamicObject>) -> Option<String> {
    let username = request.user_info.username.as_deref().unwrap_or_default();
    if username.is_empty() {
        return Some("request has no username".to_string());
    }

    if request.kind.kind != POD_KIND {
        return Some(format!(
            "expected kind {} but got {}",
            POD_KIND, request.kind.kind
        ));
    }

    None
}
