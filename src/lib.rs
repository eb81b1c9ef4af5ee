//! App Mesh Kubernetes Controller
//!
//! This controller keeps App Mesh virtual nodes in sync with their
//! `VirtualNode` custom resources, resolving `VirtualService` references into
//! mesh names and reflecting the mesh's view back into the resource status.

pub mod adapters;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod mesh;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
