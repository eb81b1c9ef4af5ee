//! App Mesh API data shapes

use serde::{Deserialize, Serialize};

/// Virtual node as reported by the mesh control plane
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeData {
    pub mesh_name: String,

    pub virtual_node_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<SdkVirtualNodeSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResourceMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VirtualNodeStatusData>,
}

impl VirtualNodeData {
    /// ARN of the virtual node, if the control plane assigned one
    pub fn arn(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.arn.as_deref())
    }

    /// Status code of the virtual node, if reported
    pub fn status_code(&self) -> Option<VirtualNodeStatusCode> {
        self.status
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .map(VirtualNodeStatusCode::parse)
    }
}

/// Resource metadata
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// Virtual node status wrapper
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeStatusData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Status code sentinel for an active virtual node
pub const VIRTUAL_NODE_STATUS_ACTIVE: &str = "ACTIVE";
/// Status code sentinel for an inactive virtual node
pub const VIRTUAL_NODE_STATUS_INACTIVE: &str = "INACTIVE";
/// Status code sentinel for a deleted virtual node
pub const VIRTUAL_NODE_STATUS_DELETED: &str = "DELETED";

/// Known virtual node status codes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VirtualNodeStatusCode {
    Active,
    Inactive,
    Deleted,
    /// A code outside the known set
    Unrecognized(String),
}

impl VirtualNodeStatusCode {
    /// Parse a status code string
    pub fn parse(code: &str) -> Self {
        match code {
            VIRTUAL_NODE_STATUS_ACTIVE => VirtualNodeStatusCode::Active,
            VIRTUAL_NODE_STATUS_INACTIVE => VirtualNodeStatusCode::Inactive,
            VIRTUAL_NODE_STATUS_DELETED => VirtualNodeStatusCode::Deleted,
            other => VirtualNodeStatusCode::Unrecognized(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, VirtualNodeStatusCode::Active)
    }
}

/// Virtual node spec as accepted by the mesh control plane
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkVirtualNodeSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<SdkListener>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_discovery: Option<SdkServiceDiscovery>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<SdkBackend>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkListener {
    pub port_mapping: SdkPortMapping,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkPortMapping {
    pub port: i64,
    pub protocol: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkServiceDiscovery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<SdkDnsServiceDiscovery>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkDnsServiceDiscovery {
    pub hostname: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkBackend {
    pub virtual_service: SdkVirtualServiceBackend,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkVirtualServiceBackend {
    pub virtual_service_name: String,
}
