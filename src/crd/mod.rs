//! Custom Resource Definitions for the App Mesh controller

mod common;
mod virtual_node;
mod virtual_service;

pub use common::*;
pub use virtual_node::*;
pub use virtual_service::*;

use kube::CustomResourceExt;

/// Generate all CRD YAML manifests
pub fn generate_crds() -> Result<Vec<String>, serde_yaml::Error> {
    Ok(vec![
        serde_yaml::to_string(&VirtualNode::crd())?,
        serde_yaml::to_string(&VirtualService::crd())?,
    ])
}
