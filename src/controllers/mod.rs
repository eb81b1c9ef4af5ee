//! Kubernetes controllers for App Mesh CRDs
//!
//! This module contains the controller implementations that watch for CRD changes
//! and trigger reconciliation.

mod virtual_node_controller;

pub use virtual_node_controller::run as run_virtual_node_controller;

use kube::Client;

use crate::config::OperatorConfig;
use crate::mesh::HttpMeshClient;
use crate::reconcilers::status::KubeStatusStore;

/// Shared context for all controllers
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Mesh control plane client
    pub mesh: HttpMeshClient,
    /// Status persistence
    pub store: KubeStatusStore,
    /// Controller configuration
    pub config: OperatorConfig,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client, mesh: HttpMeshClient, config: OperatorConfig) -> Self {
        Self {
            store: KubeStatusStore::new(client.clone()),
            client,
            mesh,
            config,
        }
    }
}
