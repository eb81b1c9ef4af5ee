//! VirtualNode Custom Resource Definition

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ConditionStatus, MeshReference, VirtualServiceReference};

/// VirtualNode resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "appmesh.k8s.aws",
    version = "v1beta2",
    kind = "VirtualNode",
    plural = "virtualnodes",
    singular = "virtualnode",
    shortname = "vn",
    namespaced,
    status = "VirtualNodeStatus",
    printcolumn = r#"{"name": "ARN", "type": "string", "jsonPath": ".status.virtualNodeARN"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeSpec {
    /// Name of the virtual node in the mesh control plane
    ///
    /// Defaults to `{name}_{namespace}` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_name: Option<String>,

    /// Mesh this virtual node belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_ref: Option<MeshReference>,

    /// Listeners accepting inbound traffic
    #[serde(default)]
    pub listeners: Vec<Listener>,

    /// Service discovery for this node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_discovery: Option<ServiceDiscovery>,

    /// Virtual services this node sends outbound traffic to
    #[serde(default)]
    pub backends: Vec<Backend>,
}

/// Listener definition
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    pub port_mapping: PortMapping,
}

/// Port and protocol of a listener
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub port: i64,
    pub protocol: PortProtocol,
}

/// Listener protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PortProtocol {
    Http,
    Http2,
    Grpc,
    Tcp,
}

/// Service discovery configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDiscovery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsServiceDiscovery>,
}

/// DNS based service discovery
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DnsServiceDiscovery {
    pub hostname: String,
}

/// Backend of a virtual node
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    pub virtual_service: VirtualServiceBackend,
}

/// Virtual service backend, given either by reference or by ARN
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceBackend {
    /// Reference to a VirtualService in the cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_service_ref: Option<VirtualServiceReference>,

    /// ARN of a virtual service managed outside the cluster
    #[serde(rename = "virtualServiceARN", skip_serializing_if = "Option::is_none")]
    pub virtual_service_arn: Option<String>,
}

/// VirtualNode status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeStatus {
    /// ARN of the virtual node in the mesh control plane
    #[serde(rename = "virtualNodeARN", skip_serializing_if = "Option::is_none")]
    pub virtual_node_arn: Option<String>,

    /// Status conditions, at most one per type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<VirtualNodeCondition>,
}

impl VirtualNodeStatus {
    /// Find the condition of the given type
    pub fn condition(&self, type_: VirtualNodeConditionType) -> Option<&VirtualNodeCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}

/// Condition types tracked on a VirtualNode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum VirtualNodeConditionType {
    /// The virtual node is active in the mesh control plane
    #[serde(rename = "VirtualNodeActive")]
    Active,
}

/// VirtualNode status condition
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeCondition {
    /// Condition type
    #[serde(rename = "type")]
    pub type_: VirtualNodeConditionType,

    /// Status (True, False, Unknown)
    pub status: ConditionStatus,

    /// Last transition time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    /// Reason for the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
