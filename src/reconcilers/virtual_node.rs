//! VirtualNode reconciler
//!
//! Handles the business logic for virtual nodes:
//! - Spec validation
//! - Building the mesh request from resolved references
//! - Creating or updating the virtual node in the mesh
//! - Status updates

use kube::ResourceExt;
use tracing::{info, warn};

use super::references::{
    build_virtual_service_reference_convert_fn, ensure_resolved, resolve_references,
    VirtualServicesByRef,
};
use super::status::{reconcile_status, StatusStore, StatusUpdate};
use crate::crd::{PortProtocol, VirtualNode, VirtualServiceReference};
use crate::error::{Error, Result};
use crate::mesh::{
    MeshApi, SdkBackend, SdkDnsServiceDiscovery, SdkListener, SdkPortMapping,
    SdkServiceDiscovery, SdkVirtualNodeSpec, SdkVirtualServiceBackend,
};
use crate::metrics;

/// Validate the VirtualNode spec
pub fn validate(vn: &VirtualNode) -> Result<()> {
    mesh_name(vn)?;

    for listener in &vn.spec.listeners {
        let port = listener.port_mapping.port;
        if !(1..=65535).contains(&port) {
            return Err(Error::validation(format!(
                "Invalid listener port {}: must be between 1 and 65535",
                port
            )));
        }
    }

    for backend in &vn.spec.backends {
        let vs = &backend.virtual_service;
        match (&vs.virtual_service_ref, &vs.virtual_service_arn) {
            (Some(_), Some(_)) => {
                return Err(Error::validation(
                    "Backend must set only one of virtualServiceRef or virtualServiceARN",
                ));
            }
            (None, None) => {
                return Err(Error::validation(
                    "Backend must set one of virtualServiceRef or virtualServiceARN",
                ));
            }
            (Some(reference), None) if reference.name.is_empty() => {
                return Err(Error::validation("Backend virtualServiceRef name must not be empty"));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Name of the mesh the VirtualNode belongs to
pub fn mesh_name(vn: &VirtualNode) -> Result<&str> {
    vn.spec
        .mesh_ref
        .as_ref()
        .map(|m| m.name.as_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::validation("meshRef must be specified"))
}

/// Name of the virtual node in the mesh control plane
pub fn aws_name(vn: &VirtualNode) -> String {
    match vn.spec.aws_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{}_{}",
            vn.name_any(),
            vn.namespace().unwrap_or_else(|| "default".to_string())
        ),
    }
}

/// VirtualService references embedded in the backends, in backend order
pub fn virtual_service_references(vn: &VirtualNode) -> impl Iterator<Item = &VirtualServiceReference> {
    vn.spec
        .backends
        .iter()
        .filter_map(|b| b.virtual_service.virtual_service_ref.as_ref())
}

/// Extract the virtual service name from a virtual service ARN
///
/// ARNs look like `arn:aws:appmesh:{region}:{account}:mesh/{mesh}/virtualService/{name}`.
pub fn virtual_service_name_from_arn(arn: &str) -> Result<String> {
    arn.rsplit_once("/virtualService/")
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("Invalid virtual service ARN '{}'", arn)))
}

fn protocol_name(protocol: PortProtocol) -> &'static str {
    match protocol {
        PortProtocol::Http => "http",
        PortProtocol::Http2 => "http2",
        PortProtocol::Grpc => "grpc",
        PortProtocol::Tcp => "tcp",
    }
}

/// Build the mesh request spec for a VirtualNode
///
/// Every reference is resolved even if an earlier one fails, so the error
/// names all unresolved references at once.
pub fn build_sdk_virtual_node_spec(
    vn: &VirtualNode,
    vs_by_ref: &VirtualServicesByRef,
) -> Result<SdkVirtualNodeSpec> {
    let namespace = vn.namespace().unwrap_or_else(|| "default".to_string());
    let convert = build_virtual_service_reference_convert_fn(vs_by_ref);
    let outcomes = resolve_references(virtual_service_references(vn), &convert);

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!(namespace = %namespace, error = %e, "Unresolved backend reference");
            metrics::UNRESOLVED_REFERENCES
                .with_label_values(&[namespace.as_str()])
                .inc();
        }
    }

    let mut resolved = ensure_resolved(outcomes)?.into_iter();

    let backends = vn
        .spec
        .backends
        .iter()
        .map(|backend| -> Result<SdkBackend> {
            let vs = &backend.virtual_service;
            let virtual_service_name = match (&vs.virtual_service_ref, &vs.virtual_service_arn) {
                (Some(reference), _) => resolved.next().ok_or_else(|| Error::UnresolvedReference {
                    reference: reference.clone(),
                })?,
                (None, Some(arn)) => virtual_service_name_from_arn(arn)?,
                (None, None) => {
                    return Err(Error::validation(
                        "Backend must set one of virtualServiceRef or virtualServiceARN",
                    ))
                }
            };
            Ok(SdkBackend {
                virtual_service: SdkVirtualServiceBackend {
                    virtual_service_name,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let listeners = vn
        .spec
        .listeners
        .iter()
        .map(|l| SdkListener {
            port_mapping: SdkPortMapping {
                port: l.port_mapping.port,
                protocol: protocol_name(l.port_mapping.protocol).to_string(),
            },
        })
        .collect();

    let service_discovery = vn.spec.service_discovery.as_ref().map(|sd| SdkServiceDiscovery {
        dns: sd.dns.as_ref().map(|dns| SdkDnsServiceDiscovery {
            hostname: dns.hostname.clone(),
        }),
    });

    Ok(SdkVirtualNodeSpec {
        listeners,
        service_discovery,
        backends,
    })
}

/// Reconcile a VirtualNode with the mesh and converge its status
///
/// The remote virtual node is created when missing and updated only when its
/// spec differs from the one built locally.
pub async fn reconcile<M: MeshApi, S: StatusStore>(
    vn: &VirtualNode,
    vs_by_ref: &VirtualServicesByRef,
    mesh: &M,
    store: &S,
) -> Result<StatusUpdate> {
    validate(vn)?;
    let mesh_name = mesh_name(vn)?;
    let aws_name = aws_name(vn);
    let desired = build_sdk_virtual_node_spec(vn, vs_by_ref)?;

    let observed = match mesh.describe_virtual_node(mesh_name, &aws_name).await? {
        None => {
            info!(mesh = %mesh_name, aws_name = %aws_name, "Creating virtual node");
            mesh.create_virtual_node(mesh_name, &aws_name, &desired).await?
        }
        Some(existing) if existing.spec.as_ref() != Some(&desired) => {
            info!(mesh = %mesh_name, aws_name = %aws_name, "Updating virtual node");
            mesh.update_virtual_node(mesh_name, &aws_name, &desired).await?
        }
        Some(existing) => existing,
    };

    reconcile_status(vn, &observed, store).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_service_name_from_arn() {
        assert_eq!(
            virtual_service_name_from_arn(
                "arn:aws:appmesh:us-west-2:123456789012:mesh/mesh-1/virtualService/vs-1.my-ns"
            )
            .unwrap(),
            "vs-1.my-ns"
        );
        assert!(virtual_service_name_from_arn("arn:aws:appmesh:us-west-2:1:mesh/mesh-1").is_err());
        assert!(virtual_service_name_from_arn("mesh/m/virtualService/").is_err());
    }

    #[test]
    fn test_protocol_names() {
        assert_eq!(protocol_name(PortProtocol::Http), "http");
        assert_eq!(protocol_name(PortProtocol::Http2), "http2");
        assert_eq!(protocol_name(PortProtocol::Grpc), "grpc");
        assert_eq!(protocol_name(PortProtocol::Tcp), "tcp");
    }
}
