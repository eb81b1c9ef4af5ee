//! VirtualNode controller
//!
//! Watches VirtualNode resources and triggers reconciliation.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use kube::{
    api::ListParams,
    runtime::{
        controller::{Action, Controller},
        watcher::Config as WatcherConfig,
    },
    Api, Client, ResourceExt,
};
use tracing::{error, info, instrument};

use crate::adapters::find_referenced_virtual_services;
use crate::controllers::Context;
use crate::crd::{ConditionStatus, VirtualNode, VirtualNodeConditionType};
use crate::error::{Error, Result};
use crate::metrics;
use crate::reconcilers::virtual_node as virtual_node_reconciler;

/// Requeue interval while the virtual node is not yet active
const NOT_ACTIVE_REQUEUE: Duration = Duration::from_secs(30);

/// Run the VirtualNode controller
pub async fn run(client: Client, context: Arc<Context>) {
    let api: Api<VirtualNode> = Api::all(client.clone());

    // Verify CRD is installed
    if let Err(e) = api.list(&ListParams::default().limit(1)).await {
        error!("VirtualNode CRD not installed: {}", e);
        return;
    }

    info!("Starting VirtualNode controller");

    Controller::new(api, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((obj, _action)) => {
                    info!(
                        name = %obj.name,
                        namespace = obj.namespace.as_deref().unwrap_or("default"),
                        "Reconciled VirtualNode"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation error");
                    metrics::RECONCILIATION_ERRORS
                        .with_label_values(&["VirtualNode"])
                        .inc();
                }
            }
        })
        .await;
}

/// Main reconciliation function
#[instrument(skip(ctx), fields(name = %obj.name_any(), namespace = obj.namespace()))]
async fn reconcile(obj: Arc<VirtualNode>, ctx: Arc<Context>) -> Result<Action> {
    let _timer = metrics::RECONCILE_DURATION
        .with_label_values(&["VirtualNode"])
        .start_timer();
    metrics::RECONCILIATIONS
        .with_label_values(&["VirtualNode"])
        .inc();

    if obj.metadata.deletion_timestamp.is_some() {
        info!("VirtualNode is being deleted, skipping");
        return Ok(Action::await_change());
    }

    let vs_by_ref = find_referenced_virtual_services(&ctx.client, &obj).await?;
    let update = virtual_node_reconciler::reconcile(&obj, &vs_by_ref, &ctx.mesh, &ctx.store).await?;

    let active = update
        .status
        .condition(VirtualNodeConditionType::Active)
        .is_some_and(|c| c.status == ConditionStatus::True);

    if active {
        Ok(Action::requeue(ctx.config.resync_interval))
    } else {
        Ok(Action::requeue(NOT_ACTIVE_REQUEUE))
    }
}

/// Error policy for the controller
fn error_policy(obj: Arc<VirtualNode>, error: &Error, _ctx: Arc<Context>) -> Action {
    let name = obj.name_any();
    error!(
        name = %name,
        error = %error,
        "Reconciliation failed, scheduling retry"
    );

    Action::requeue(requeue_after(error))
}

/// Requeue interval for a failed reconciliation
fn requeue_after(error: &Error) -> Duration {
    match error {
        Error::Kube(_) | Error::Persistence(_) => Duration::from_secs(30),
        Error::UnresolvedReference { .. } | Error::UnresolvedReferences(_) => {
            Duration::from_secs(30)
        }
        Error::Config(_) | Error::Validation(_) => Duration::from_secs(300),
        Error::Mesh(_) | Error::Http(_) => Duration::from_secs(60),
    }
}
