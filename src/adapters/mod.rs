//! Adapters for looking up cluster objects referenced by VirtualNodes

mod virtual_services;

pub use virtual_services::*;
