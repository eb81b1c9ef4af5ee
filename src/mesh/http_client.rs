//! HTTP client for the App Mesh REST API

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MeshApi, SdkVirtualNodeSpec, VirtualNodeData};
use crate::error::{Error, Result};
use crate::metrics;

/// App Mesh API version path prefix
const API_VERSION: &str = "v20190125";

/// Mesh control plane client speaking JSON over HTTP
///
/// Authentication is expected to be handled by the endpoint (for example a
/// signing proxy sidecar). Calls are made once; retries are left to the
/// controller's requeue.
#[derive(Clone, Debug)]
pub struct HttpMeshClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVirtualNodeInput<'a> {
    virtual_node_name: &'a str,
    spec: &'a SdkVirtualNodeSpec,
}

#[derive(Serialize)]
struct UpdateVirtualNodeInput<'a> {
    spec: &'a SdkVirtualNodeSpec,
}

/// Response body of Describe/Create/UpdateVirtualNode
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualNodeOutput {
    virtual_node: VirtualNodeData,
}

async fn decode_virtual_node(response: Response) -> Result<VirtualNodeData> {
    let output: VirtualNodeOutput = response.json().await?;
    Ok(output.virtual_node)
}

impl HttpMeshClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("appmesh-controller/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn virtual_nodes_url(&self, mesh_name: &str) -> String {
        format!("{}/{}/meshes/{}/virtualNodes", self.endpoint, API_VERSION, mesh_name)
    }

    fn virtual_node_url(&self, mesh_name: &str, virtual_node_name: &str) -> String {
        format!("{}/{}", self.virtual_nodes_url(mesh_name), virtual_node_name)
    }
}

/// Turn a non-success response into an error, recording the call outcome
async fn check_response(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        metrics::MESH_API_CALLS
            .with_label_values(&[operation, "success"])
            .inc();
        return Ok(response);
    }

    metrics::MESH_API_CALLS
        .with_label_values(&[operation, "failure"])
        .inc();
    let body = response.text().await.unwrap_or_default();
    Err(Error::mesh(format!("{} returned {}: {}", operation, status, body)))
}

#[async_trait]
impl MeshApi for HttpMeshClient {
    async fn describe_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
    ) -> Result<Option<VirtualNodeData>> {
        let url = self.virtual_node_url(mesh_name, virtual_node_name);
        debug!(url = %url, "DescribeVirtualNode");

        let response = self.http.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            metrics::MESH_API_CALLS
                .with_label_values(&["DescribeVirtualNode", "not_found"])
                .inc();
            return Ok(None);
        }

        let response = check_response("DescribeVirtualNode", response).await?;
        Ok(Some(decode_virtual_node(response).await?))
    }

    async fn create_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData> {
        let url = self.virtual_nodes_url(mesh_name);
        debug!(url = %url, "CreateVirtualNode");

        let input = CreateVirtualNodeInput {
            virtual_node_name,
            spec,
        };
        let response = self.http.put(&url).json(&input).send().await?;
        let response = check_response("CreateVirtualNode", response).await?;
        decode_virtual_node(response).await
    }

    async fn update_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData> {
        let url = self.virtual_node_url(mesh_name, virtual_node_name);
        debug!(url = %url, "UpdateVirtualNode");

        let response = self
            .http
            .put(&url)
            .json(&UpdateVirtualNodeInput { spec })
            .send()
            .await?;
        let response = check_response("UpdateVirtualNode", response).await?;
        decode_virtual_node(response).await
    }
}
