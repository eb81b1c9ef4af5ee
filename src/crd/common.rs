//! Types shared between App Mesh custom resources

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to the mesh a resource belongs to
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeshReference {
    /// Name of the mesh
    pub name: String,

    /// UID of the mesh object, pinned at admission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Reference to a VirtualService by name
///
/// A missing namespace means the namespace of the referring object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceReference {
    /// Namespace of the VirtualService
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Name of the VirtualService
    pub name: String,
}

impl VirtualServiceReference {
    /// Namespace the reference points into, given the referrer's namespace
    pub fn namespace_or<'a>(&'a self, referrer_namespace: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(referrer_namespace)
    }
}

impl fmt::Display for VirtualServiceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{namespace: {}, name: {}}}",
            self.namespace.as_deref().unwrap_or("<nil>"),
            self.name
        )
    }
}

/// Status of a condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}
