//! Toleration policy.
//!
//! Pods in a protected namespace may not tolerate the infra or master
//! node-role taints with a `NoSchedule` or `PreferNoSchedule` effect. Anything
//! else is left to RBAC.
//!
//! Validates:
//! - infra node role x NoSchedule / PreferNoSchedule
//! - master node role x NoSchedule / PreferNoSchedule

use std::fmt;

use super::ValidationResult;
use super::namespace::NamespaceClass;

/// Taint key marking infra nodes
pub const INFRA_NODE_ROLE: &str = "node-role.kubernetes.io/infra";

/// Taint key marking master/control-plane nodes
pub const MASTER_NODE_ROLE: &str = "node-role.kubernetes.io/master";

/// Taint effects that a protected-namespace pod may not tolerate on a
/// protected node role
pub const DENYING_EFFECTS: [TaintEffect; 2] = [TaintEffect::NoSchedule, TaintEffect::PreferNoSchedule];

/// Reason code for the allow verdict
pub const RBAC_DEFERRED_REASON: &str = "RbacDeferred";

/// Message for the allow verdict
pub const RBAC_DEFERRED_MESSAGE: &str =
    "Allowed to create a Pod in a privileged Namespace because of RBAC";

/// Scheduling consequence of a node taint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

impl TaintEffect {
    /// Parse a Kubernetes effect string. Empty or unknown values yield `None`.
    pub fn parse(effect: &str) -> Option<Self> {
        match effect {
            "NoSchedule" => Some(TaintEffect::NoSchedule),
            "PreferNoSchedule" => Some(TaintEffect::PreferNoSchedule),
            "NoExecute" => Some(TaintEffect::NoExecute),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NoSchedule",
            TaintEffect::PreferNoSchedule => "PreferNoSchedule",
            TaintEffect::NoExecute => "NoExecute",
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toleration operator. Not consulted by the policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TolerationOperator {
    #[default]
    Equal,
    Exists,
}

impl TolerationOperator {
    /// Parse a Kubernetes operator string; anything but `Exists` is `Equal`
    pub fn parse(operator: &str) -> Self {
        if operator == "Exists" {
            TolerationOperator::Exists
        } else {
            TolerationOperator::Equal
        }
    }
}

/// Decision-relevant part of a pod toleration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toleration {
    pub key: String,
    pub operator: TolerationOperator,
    pub effect: Option<TaintEffect>,
}

impl Toleration {
    pub fn new(key: impl Into<String>, effect: Option<TaintEffect>) -> Self {
        Self {
            key: key.into(),
            operator: TolerationOperator::default(),
            effect,
        }
    }
}

impl From<&k8s_openapi::api::core::v1::Toleration> for Toleration {
    fn from(t: &k8s_openapi::api::core::v1::Toleration) -> Self {
        Self {
            key: t.key.clone().unwrap_or_default(),
            operator: t
                .operator
                .as_deref()
                .map(TolerationOperator::parse)
                .unwrap_or_default(),
            effect: t.effect.as_deref().and_then(TaintEffect::parse),
        }
    }
}

/// One row of the deny table
struct DenyRule {
    key: &'static str,
    effect: TaintEffect,
    reason: &'static str,
    message: &'static str,
}

static DENY_RULES: [DenyRule; 4] = [
    DenyRule {
        key: INFRA_NODE_ROLE,
        effect: TaintEffect::NoSchedule,
        reason: "InfraNoSchedule",
        message: "Not allowed to schedule a pod with NoSchedule taint on infra node",
    },
    DenyRule {
        key: INFRA_NODE_ROLE,
        effect: TaintEffect::PreferNoSchedule,
        reason: "InfraPreferNoSchedule",
        message: "Not allowed to schedule a pod with PreferNoSchedule taint on infra node",
    },
    DenyRule {
        key: MASTER_NODE_ROLE,
        effect: TaintEffect::NoSchedule,
        reason: "MasterNoSchedule",
        message: "Not allowed to schedule a pod with NoSchedule taint on master node",
    },
    DenyRule {
        key: MASTER_NODE_ROLE,
        effect: TaintEffect::PreferNoSchedule,
        reason: "MasterPreferNoSchedule",
        message: "Not allowed to schedule a pod with PreferNoSchedule taint on master node",
    },
];

fn matching_rule(toleration: &Toleration) -> Option<&'static DenyRule> {
    let effect = toleration.effect?;
    DENY_RULES
        .iter()
        .find(|rule| rule.key == toleration.key && rule.effect == effect)
}

/// Evaluate a pod's tolerations for its namespace class
pub fn evaluate(class: NamespaceClass, tolerations: &[Toleration]) -> ValidationResult {
    if class == NamespaceClass::Protected
        && let Some(rule) = tolerations.iter().find_map(matching_rule)
    {
        return ValidationResult::denied(rule.reason, rule.message);
    }

    ValidationResult::allowed(RBAC_DEFERRED_REASON, RBAC_DEFERRED_MESSAGE)
}
