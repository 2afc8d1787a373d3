//! Namespace classification.
//!
//! A namespace is `Protected` when it belongs to one of the system,
//! infrastructure or default namespace families, unless it is carved out by
//! the exception pattern. The exception pattern always wins.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Namespace families reserved for platform workloads
pub const PROTECTED_NAMESPACE_PATTERN: &str =
    r"(^kube$|^kube-.*|^openshift$|^openshift-.*|^default$|^redhat-.*)";

/// Platform add-on namespaces exempt from the toleration restriction.
///
/// Unanchored: a namespace containing either name anywhere matches.
pub const EXCEPTION_NAMESPACE_PATTERN: &str = r"(openshift-logging|openshift-operators)";

/// Classification of a namespace for the toleration policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamespaceClass {
    /// Tolerations for infra/master taints are restricted
    Protected,
    /// No toleration restriction applies
    Exempt,
}

impl fmt::Display for NamespaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceClass::Protected => write!(f, "Protected"),
            NamespaceClass::Exempt => write!(f, "Exempt"),
        }
    }
}

/// Two compiled patterns evaluated in fixed precedence
#[derive(Clone, Debug)]
pub struct NamespaceClassifier {
    protected: Regex,
    exception: Regex,
}

impl NamespaceClassifier {
    /// Build a classifier from a protected pattern and an exception pattern
    pub fn new(protected: &str, exception: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            protected: Regex::new(protected)?,
            exception: Regex::new(exception)?,
        })
    }

    /// Build the classifier for the standard pattern constants
    pub fn standard() -> Result<Self, regex::Error> {
        Self::new(PROTECTED_NAMESPACE_PATTERN, EXCEPTION_NAMESPACE_PATTERN)
    }

    /// Classify a namespace name
    pub fn classify(&self, namespace: &str) -> NamespaceClass {
        if self.exception.is_match(namespace) {
            return NamespaceClass::Exempt;
        }
        if self.protected.is_match(namespace) {
            NamespaceClass::Protected
        } else {
            NamespaceClass::Exempt
        }
    }
}

static STANDARD_CLASSIFIER: LazyLock<Option<NamespaceClassifier>> =
    LazyLock::new(|| NamespaceClassifier::standard().ok());

/// Classify a namespace using the standard patterns.
///
/// Fails closed: if the standard patterns could not be compiled every
/// namespace is treated as `Protected`.
pub fn classify(namespace: &str) -> NamespaceClass {
    STANDARD_CLASSIFIER
        .as_ref()
        .map_or(NamespaceClass::Protected, |c| c.classify(namespace))
}
