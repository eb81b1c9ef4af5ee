//! VirtualService lookup for backend references

use futures::future::try_join_all;
use kube::{Api, Client, ResourceExt};
use tracing::debug;

use crate::crd::{VirtualNode, VirtualService, VirtualServiceReference};
use crate::error::Result;
use crate::reconcilers::references::VirtualServicesByRef;
use crate::reconcilers::virtual_node::virtual_service_references;

/// Fetch a VirtualService, returning `None` if it does not exist
pub async fn get_virtual_service(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<Option<VirtualService>> {
    let api: Api<VirtualService> = Api::namespaced(client.clone(), namespace);
    Ok(api.get_opt(name).await?)
}

/// Plan the VirtualService lookups for a VirtualNode's backends
///
/// Each distinct reference appears once, paired with the namespace it is fetched
/// from. References without a namespace resolve in the VirtualNode's namespace.
pub fn plan_lookups(vn: &VirtualNode) -> Vec<(&VirtualServiceReference, String)> {
    let namespace = vn.namespace().unwrap_or_else(|| "default".to_string());

    let mut references: Vec<&VirtualServiceReference> = virtual_service_references(vn).collect();
    references.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
    references.dedup();

    references
        .into_iter()
        .map(|reference| (reference, reference.namespace_or(&namespace).to_string()))
        .collect()
}

/// Fetch every VirtualService referenced by the VirtualNode's backends
///
/// Missing VirtualServices are left out of the map.
pub async fn find_referenced_virtual_services(
    client: &Client,
    vn: &VirtualNode,
) -> Result<VirtualServicesByRef> {
    let lookups = plan_lookups(vn).into_iter().map(|(reference, namespace)| async move {
        let found = get_virtual_service(client, &reference.name, &namespace).await?;
        if found.is_none() {
            debug!(reference = %reference, "Referenced VirtualService not found");
        }
        Ok::<_, crate::Error>(found.map(|vs| (reference.clone(), vs)))
    });

    Ok(try_join_all(lookups).await?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{Backend, MeshReference, VirtualNodeSpec, VirtualServiceBackend};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn reference(namespace: Option<&str>, name: &str) -> VirtualServiceReference {
        VirtualServiceReference {
            namespace: namespace.map(String::from),
            name: name.to_string(),
        }
    }

    fn backend(reference: Option<VirtualServiceReference>) -> Backend {
        Backend {
            virtual_service: VirtualServiceBackend {
                virtual_service_ref: reference,
                virtual_service_arn: None,
            },
        }
    }

    fn virtual_node(namespace: Option<&str>, backends: Vec<Backend>) -> VirtualNode {
        VirtualNode {
            metadata: ObjectMeta {
                name: Some("vn-1".to_string()),
                namespace: namespace.map(String::from),
                ..Default::default()
            },
            spec: VirtualNodeSpec {
                aws_name: None,
                mesh_ref: Some(MeshReference {
                    name: "mesh-1".to_string(),
                    uid: None,
                }),
                listeners: vec![],
                service_discovery: None,
                backends,
            },
            status: None,
        }
    }

    #[test]
    fn test_plan_defaults_namespace_to_virtual_node() {
        let vn = virtual_node(
            Some("my-ns"),
            vec![
                backend(Some(reference(None, "vs-1"))),
                backend(Some(reference(Some("other"), "vs-2"))),
            ],
        );

        let plan = plan_lookups(&vn);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], (&reference(None, "vs-1"), "my-ns".to_string()));
        assert_eq!(plan[1], (&reference(Some("other"), "vs-2"), "other".to_string()));
    }

    #[test]
    fn test_plan_dedups_repeated_references() {
        let vn = virtual_node(
            Some("my-ns"),
            vec![
                backend(Some(reference(Some("my-ns"), "vs-1"))),
                backend(Some(reference(Some("my-ns"), "vs-1"))),
                backend(None),
            ],
        );

        let plan = plan_lookups(&vn);
        assert_eq!(plan, vec![(&reference(Some("my-ns"), "vs-1"), "my-ns".to_string())]);
    }

    #[test]
    fn test_plan_keeps_written_and_defaulted_forms_apart() {
        // Both forms land in the same namespace but key the map separately
        let vn = virtual_node(
            Some("my-ns"),
            vec![
                backend(Some(reference(None, "vs-1"))),
                backend(Some(reference(Some("my-ns"), "vs-1"))),
            ],
        );

        let plan = plan_lookups(&vn);
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|(_, namespace)| namespace == "my-ns"));
    }

    #[test]
    fn test_plan_without_namespace_uses_default() {
        let vn = virtual_node(None, vec![backend(Some(reference(None, "vs-1")))]);
        assert_eq!(plan_lookups(&vn)[0].1, "default");
    }
}
