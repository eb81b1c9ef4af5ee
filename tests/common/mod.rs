//! Shared test helpers: in-memory status store, fake mesh, and builders

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use appmesh_controller::crd::{
    Backend, MeshReference, VirtualNode, VirtualNodeSpec, VirtualNodeStatus, VirtualService,
    VirtualServiceBackend, VirtualServiceReference, VirtualServiceSpec,
};
use appmesh_controller::mesh::{
    MeshApi, ResourceMetadata, SdkVirtualNodeSpec, VirtualNodeData, VirtualNodeStatusData,
};
use appmesh_controller::reconcilers::status::{NamespacedName, StatusStore};
use appmesh_controller::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

// ============================================================================
// In-memory status store
// ============================================================================

#[derive(Default)]
pub struct MemoryStatusStore {
    objects: Mutex<HashMap<NamespacedName, VirtualNode>>,
    patches: AtomicUsize,
    fail_patch_with: Option<String>,
}

impl MemoryStatusStore {
    pub fn with(vn: &VirtualNode) -> Self {
        let store = Self::default();
        store.insert(vn);
        store
    }

    pub fn failing(vn: &VirtualNode, message: &str) -> Self {
        let mut store = Self::with(vn);
        store.fail_patch_with = Some(message.to_string());
        store
    }

    pub fn insert(&self, vn: &VirtualNode) {
        self.objects
            .lock()
            .unwrap()
            .insert(NamespacedName::of(vn), vn.clone());
    }

    pub fn patch_count(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn get(&self, id: &NamespacedName) -> Result<VirtualNode> {
        self.objects
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::persistence(format!("{} not found", id)))
    }

    async fn patch_status(&self, id: &NamespacedName, status: &VirtualNodeStatus) -> Result<()> {
        if let Some(message) = &self.fail_patch_with {
            return Err(Error::persistence(message.clone()));
        }
        let mut objects = self.objects.lock().unwrap();
        let vn = objects
            .get_mut(id)
            .ok_or_else(|| Error::persistence(format!("{} not found", id)))?;
        vn.status = Some(status.clone());
        self.patches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Fake mesh control plane
// ============================================================================

pub struct FakeMesh {
    existing: Mutex<Option<VirtualNodeData>>,
    status_code: String,
    pub describes: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl FakeMesh {
    pub fn empty() -> Self {
        Self {
            existing: Mutex::new(None),
            status_code: "ACTIVE".to_string(),
            describes: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn with_existing(data: VirtualNodeData) -> Self {
        let mesh = Self::empty();
        *mesh.existing.lock().unwrap() = Some(data);
        mesh
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn describes(&self) -> usize {
        self.describes.load(Ordering::SeqCst)
    }

    fn store(&self, mesh_name: &str, name: &str, spec: &SdkVirtualNodeSpec) -> VirtualNodeData {
        let data = observed_data(
            mesh_name,
            name,
            Some(spec.clone()),
            Some("arn-1"),
            Some(self.status_code.as_str()),
        );
        *self.existing.lock().unwrap() = Some(data.clone());
        data
    }
}

#[async_trait]
impl MeshApi for FakeMesh {
    async fn describe_virtual_node(
        &self,
        _mesh_name: &str,
        _virtual_node_name: &str,
    ) -> Result<Option<VirtualNodeData>> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        Ok(self.existing.lock().unwrap().clone())
    }

    async fn create_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(self.store(mesh_name, virtual_node_name, spec))
    }

    async fn update_virtual_node(
        &self,
        mesh_name: &str,
        virtual_node_name: &str,
        spec: &SdkVirtualNodeSpec,
    ) -> Result<VirtualNodeData> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(self.store(mesh_name, virtual_node_name, spec))
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn metadata(namespace: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

pub fn virtual_node(name: &str, status: Option<VirtualNodeStatus>) -> VirtualNode {
    VirtualNode {
        metadata: metadata("my-ns", name),
        spec: VirtualNodeSpec {
            aws_name: None,
            mesh_ref: Some(MeshReference {
                name: "mesh-1".to_string(),
                uid: None,
            }),
            listeners: vec![],
            service_discovery: None,
            backends: vec![],
        },
        status,
    }
}

pub fn reference(namespace: Option<&str>, name: &str) -> VirtualServiceReference {
    VirtualServiceReference {
        namespace: namespace.map(String::from),
        name: name.to_string(),
    }
}

pub fn backend_ref(reference: VirtualServiceReference) -> Backend {
    Backend {
        virtual_service: VirtualServiceBackend {
            virtual_service_ref: Some(reference),
            virtual_service_arn: None,
        },
    }
}

pub fn backend_arn(arn: &str) -> Backend {
    Backend {
        virtual_service: VirtualServiceBackend {
            virtual_service_ref: None,
            virtual_service_arn: Some(arn.to_string()),
        },
    }
}

pub fn virtual_service(namespace: &str, name: &str, aws_name: &str) -> VirtualService {
    VirtualService {
        metadata: metadata(namespace, name),
        spec: VirtualServiceSpec {
            aws_name: Some(aws_name.to_string()),
            mesh_ref: None,
        },
    }
}

pub fn observed_data(
    mesh_name: &str,
    name: &str,
    spec: Option<SdkVirtualNodeSpec>,
    arn: Option<&str>,
    code: Option<&str>,
) -> VirtualNodeData {
    VirtualNodeData {
        mesh_name: mesh_name.to_string(),
        virtual_node_name: name.to_string(),
        spec,
        metadata: Some(ResourceMetadata {
            arn: arn.map(String::from),
            ..Default::default()
        }),
        status: Some(VirtualNodeStatusData {
            status: code.map(String::from),
        }),
    }
}

pub fn observed(arn: Option<&str>, code: Option<&str>) -> VirtualNodeData {
    observed_data("mesh-1", "vn-1_my-ns", None, arn, code)
}
