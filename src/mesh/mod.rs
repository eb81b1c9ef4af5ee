//! Mesh control plane boundary
//!
//! Data types mirror the App Mesh API shapes. The [`MeshApi`] trait is the only
//! way the reconcilers talk to the control plane; transport, retries and
//! authentication belong to the implementation.

mod http_client;
mod types;

pub use http_client::HttpMeshClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Operations on virtual nodes in the mesh control plane
#[async_trait]
pub trait MeshApi: Send + Sync {
    /// Describe a virtual node, returning `None` if it does not exist
    async fn describe_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
    ) -> Result<Option<VirtualNodeData>>;

    /// Create a virtual node
    async fn create_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData>;

    /// Replace the spec of an existing virtual node
    async fn update_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData>;
}
