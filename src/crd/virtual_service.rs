//! VirtualService Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::MeshReference;

/// VirtualService resource specification
///
/// Only the fields needed to resolve references from virtual nodes are modeled.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "appmesh.k8s.aws",
    version = "v1beta2",
    kind = "VirtualService",
    plural = "virtualservices",
    singular = "virtualservice",
    shortname = "vs",
    namespaced,
    printcolumn = r#"{"name": "AWS Name", "type": "string", "jsonPath": ".spec.awsName"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    /// Name of the virtual service in the mesh control plane
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_name: Option<String>,

    /// Mesh this virtual service belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_ref: Option<MeshReference>,
}
