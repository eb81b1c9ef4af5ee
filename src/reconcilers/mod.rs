//! Reconcilers for App Mesh CRDs
//!
//! This module contains the business logic for reconciling virtual nodes.
//! Reconcilers are responsible for:
//! - Resolving VirtualService references into mesh names
//! - Creating and updating virtual nodes in the mesh
//! - Updating resource status

pub mod references;
pub mod status;
pub mod virtual_node;
