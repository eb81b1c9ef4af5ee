//! Error types for the App Mesh controller

use thiserror::Error;

use crate::crd::VirtualServiceReference;

/// Result type alias using the controller's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Status store error from a non-Kubernetes backend
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A single virtual service reference could not be mapped to a backend name
    #[error("unexpected VirtualServiceReference: {reference}")]
    UnresolvedReference { reference: VirtualServiceReference },

    /// One or more references failed while building a mesh request
    ///
    /// Each listed reference failed with [`Error::UnresolvedReference`]: its
    /// VirtualService was missing from the lookup or carried no mesh name.
    #[error("{} unresolved VirtualServiceReference(s): {}", .0.len(), join_references(.0))]
    UnresolvedReferences(Vec<VirtualServiceReference>),

    /// Mesh control plane returned a non-success response
    #[error("Mesh API error: {0}")]
    Mesh(String),

    /// HTTP transport error talking to the mesh control plane
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a mesh API error
    pub fn mesh(msg: impl Into<String>) -> Self {
        Error::Mesh(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }
}

fn join_references(refs: &[VirtualServiceReference]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
