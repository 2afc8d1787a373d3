//! Splitting an incoming `AdmissionReview` body into its request envelope and
//! the raw objects under review.
//!
//! The embedded `object` and `oldObject` stay untyped JSON until the renderer
//! decodes them. A malformed Pod payload therefore surfaces as a decode error
//! verdict carrying the request uid, and never fails the envelope itself.

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionReview};
use serde_json::{Map, Value};

use crate::error::AdmissionError;

/// An admission request with its objects held back as raw JSON
#[derive(Debug)]
pub struct PodReview {
    /// Request envelope. Its `object` and `old_object` are always `None`.
    pub request: AdmissionRequest<DynamicObject>,
    /// Incoming object state
    pub object: Option<Value>,
    /// Prior object state (UPDATE, DELETE)
    pub old_object: Option<Value>,
}

/// A body that could not be read as an `AdmissionReview`
#[derive(Debug)]
pub struct InvalidReview {
    /// Request uid when the body carried one, empty otherwise
    pub uid: String,
    pub error: AdmissionError,
}

impl InvalidReview {
    fn new(uid: &str, message: impl ToString) -> Self {
        Self {
            uid: uid.to_string(),
            error: AdmissionError::InvalidReview(message.to_string()),
        }
    }
}

impl PodReview {
    /// Parse a raw HTTP body
    pub fn from_slice(body: &[u8]) -> Result<Self, InvalidReview> {
        let review: Value = serde_json::from_slice(body).map_err(|e| InvalidReview::new("", e))?;
        Self::from_value(review)
    }

    /// Parse an `AdmissionReview` JSON document
    pub fn from_value(mut review: Value) -> Result<Self, InvalidReview> {
        let uid = review
            .pointer("/request/uid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let (object, old_object) = match review.get_mut("request").and_then(Value::as_object_mut) {
            Some(request) => (take_object(request, "object"), take_object(request, "oldObject")),
            None => (None, None),
        };

        let review: AdmissionReview<DynamicObject> =
            serde_json::from_value(review).map_err(|e| InvalidReview::new(&uid, e))?;
        let request: Result<AdmissionRequest<DynamicObject>, _> = review.try_into();
        let request = request.map_err(|e| InvalidReview::new(&uid, e))?;

        Ok(Self {
            request,
            object,
            old_object,
        })
    }
}

fn take_object(request: &mut Map<String, Value>, field: &str) -> Option<Value> {
    request.remove(field).filter(|object| !object.is_null())
}
