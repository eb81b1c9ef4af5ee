//! VirtualNode status reconciler
//!
//! Converges the persisted status of a VirtualNode towards what the mesh
//! control plane reports, issuing a status patch only when a tracked field
//! actually changed.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kube::{
    api::{Patch, PatchParams},
    Api, Client, ResourceExt,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::crd::{
    ConditionStatus, VirtualNode, VirtualNodeCondition, VirtualNodeConditionType,
    VirtualNodeStatus,
};
use crate::error::Result;
use crate::mesh::{VirtualNodeData, VirtualNodeStatusCode};
use crate::metrics;

/// Field manager used for status patches
pub const FIELD_MANAGER: &str = "appmesh-controller";

/// Identity of a namespaced object
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of a VirtualNode
    pub fn of(vn: &VirtualNode) -> Self {
        Self::new(
            vn.namespace().unwrap_or_else(|| "default".to_string()),
            vn.name_any(),
        )
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Store holding VirtualNodes and their status subresource
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Fetch a VirtualNode by identity
    ///
    /// The controller reconciles from the watch cache; this is the re-read hook
    /// for callers outside the watch loop.
    async fn get(&self, id: &NamespacedName) -> Result<VirtualNode>;

    /// Replace the status of a VirtualNode, leaving its spec untouched
    async fn patch_status(&self, id: &NamespacedName, status: &VirtualNodeStatus) -> Result<()>;
}

/// Status store backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStatusStore {
    client: Client,
}

impl KubeStatusStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<VirtualNode> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl StatusStore for KubeStatusStore {
    async fn get(&self, id: &NamespacedName) -> Result<VirtualNode> {
        Ok(self.api(&id.namespace).get(&id.name).await?)
    }

    async fn patch_status(&self, id: &NamespacedName, status: &VirtualNodeStatus) -> Result<()> {
        let patch = json!({ "status": status });
        self.api(&id.namespace)
            .patch_status(&id.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(patch))
            .await?;
        Ok(())
    }
}

/// Result of a status reconciliation
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    /// Status as it stands after reconciliation
    pub status: VirtualNodeStatus,
    /// Whether a patch was written
    pub patched: bool,
}

/// Reconcile the status of `vn` against the observed virtual node
///
/// Errors from the store are returned as-is. Everything else, including
/// "nothing to do", is a success.
pub async fn reconcile_status<S: StatusStore>(
    vn: &VirtualNode,
    observed: &VirtualNodeData,
    store: &S,
) -> Result<StatusUpdate> {
    let current = vn.status.clone().unwrap_or_default();
    let desired = compute_status(&current, observed, Utc::now());
    let id = NamespacedName::of(vn);

    if !status_differs(&current, &desired) {
        debug!(resource = %id, "Status up to date, skipping patch");
        return Ok(StatusUpdate {
            status: current,
            patched: false,
        });
    }

    store.patch_status(&id, &desired).await?;
    metrics::STATUS_PATCHES
        .with_label_values(&["VirtualNode"])
        .inc();
    info!(
        resource = %id,
        arn = desired.virtual_node_arn.as_deref().unwrap_or(""),
        "Patched VirtualNode status"
    );

    Ok(StatusUpdate {
        status: desired,
        patched: true,
    })
}

/// Compute the status `current` should converge to given `observed`
///
/// Fields the observation does not report are left as they are.
pub fn compute_status(
    current: &VirtualNodeStatus,
    observed: &VirtualNodeData,
    now: DateTime<Utc>,
) -> VirtualNodeStatus {
    let mut status = current.clone();

    if let Some(arn) = observed.arn() {
        if status.virtual_node_arn.as_deref() != Some(arn) {
            status.virtual_node_arn = Some(arn.to_string());
        }
    }

    if let Some(code) = observed.status_code() {
        if let VirtualNodeStatusCode::Unrecognized(raw) = &code {
            warn!(code = %raw, "Unrecognized virtual node status code, treating as inactive");
        }
        set_condition(
            &mut status,
            VirtualNodeConditionType::Active,
            ConditionStatus::from(code.is_active()),
            now,
        );
    }

    status
}

/// Add a condition, or update the existing one of the same type if its state changed
fn set_condition(
    status: &mut VirtualNodeStatus,
    type_: VirtualNodeConditionType,
    value: ConditionStatus,
    now: DateTime<Utc>,
) {
    match status.conditions.iter_mut().find(|c| c.type_ == type_) {
        Some(existing) => {
            if existing.status != value {
                existing.status = value;
                existing.last_transition_time = Some(now);
            }
        }
        None => status.conditions.push(VirtualNodeCondition {
            type_,
            status: value,
            last_transition_time: Some(now),
            reason: None,
            message: None,
        }),
    }
}

/// Whether two statuses differ in any tracked field
///
/// Transition timestamps are not tracked.
pub fn status_differs(a: &VirtualNodeStatus, b: &VirtualNodeStatus) -> bool {
    a.virtual_node_arn != b.virtual_node_arn
        || a.conditions.len() != b.conditions.len()
        || a
            .conditions
            .iter()
            .zip(&b.conditions)
            .any(|(x, y)| !condition_equal(x, y))
}

fn condition_equal(a: &VirtualNodeCondition, b: &VirtualNodeCondition) -> bool {
    a.type_ == b.type_ && a.status == b.status && a.reason == b.reason && a.message == b.message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ResourceMetadata, VirtualNodeStatusData};
    use chrono::TimeZone;

    fn observed(arn: Option<&str>, code: Option<&str>) -> VirtualNodeData {
        VirtualNodeData {
            mesh_name: "mesh-1".to_string(),
            virtual_node_name: "vn-1_default".to_string(),
            spec: None,
            metadata: Some(ResourceMetadata {
                arn: arn.map(String::from),
                ..Default::default()
            }),
            status: Some(VirtualNodeStatusData {
                status: code.map(String::from),
            }),
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_absent_observation_leaves_status_unchanged() {
        let current = VirtualNodeStatus::default();
        let desired = compute_status(&current, &observed(None, None), t(0));
        assert!(desired.virtual_node_arn.is_none());
        assert!(desired.conditions.is_empty());
        assert!(!status_differs(&current, &desired));
    }

    #[test]
    fn test_arn_is_not_cleared_by_absent_observation() {
        let current = VirtualNodeStatus {
            virtual_node_arn: Some("arn-1".to_string()),
            conditions: vec![],
        };
        let desired = compute_status(&current, &observed(None, None), t(0));
        assert_eq!(desired.virtual_node_arn.as_deref(), Some("arn-1"));
    }

    #[test]
    fn test_active_code_maps_to_true_and_others_to_false() {
        let current = VirtualNodeStatus::default();
        for (code, expected) in [
            ("ACTIVE", ConditionStatus::True),
            ("INACTIVE", ConditionStatus::False),
            ("DELETED", ConditionStatus::False),
            ("SOMETHING_NEW", ConditionStatus::False),
        ] {
            let desired = compute_status(&current, &observed(None, Some(code)), t(0));
            let condition = desired.condition(VirtualNodeConditionType::Active).unwrap();
            assert_eq!(condition.status, expected, "code {}", code);
        }
    }

    #[test]
    fn test_transition_time_only_moves_on_change() {
        let current = compute_status(
            &VirtualNodeStatus::default(),
            &observed(Some("arn-1"), Some("ACTIVE")),
            t(10),
        );

        let same = compute_status(&current, &observed(Some("arn-1"), Some("ACTIVE")), t(20));
        assert_eq!(same.conditions[0].last_transition_time, Some(t(10)));

        let flipped = compute_status(&current, &observed(Some("arn-1"), Some("INACTIVE")), t(30));
        assert_eq!(flipped.conditions.len(), 1);
        assert_eq!(flipped.conditions[0].status, ConditionStatus::False);
        assert_eq!(flipped.conditions[0].last_transition_time, Some(t(30)));
    }

    #[test]
    fn test_status_differs_ignores_timestamps() {
        let mut a = compute_status(
            &VirtualNodeStatus::default(),
            &observed(Some("arn-1"), Some("ACTIVE")),
            t(1),
        );
        let b = a.clone();
        a.conditions[0].last_transition_time = Some(t(999));
        assert!(!status_differs(&a, &b));

        a.conditions[0].status = ConditionStatus::Unknown;
        assert!(status_differs(&a, &b));
    }

    #[test]
    fn test_namespaced_name_display() {
        assert_eq!(NamespacedName::new("apps", "vn-1").to_string(), "apps/vn-1");
    }
}
