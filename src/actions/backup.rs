//! Backup-phase item action for CNPG Cluster resources
//!
//! Stamps the backup-location parameters discovered in the cluster's own
//! spec onto the resource as annotations, so the restore action can later
//! reconstruct a recover-from-backup configuration without the live
//! source cluster. The document itself is otherwise returned unchanged.

use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::actions::{self, CLUSTER_RESOURCE, OperationDescriptor, ResourceSelector};
use crate::api::ClusterOps;
use crate::cluster::backups::latest_completed_backup_id;
use crate::cluster::params::extract_plugin_parameters;
use crate::document::annotations::{
    self, ANNOTATION_BARMAN_OBJECT_NAME, ANNOTATION_CURRENT_BACKUP_ID, ANNOTATION_SERVER_NAME,
};
use crate::error::Result;

/// Budget for the best-effort backup-ID lookup. Exceeding it is a soft
/// failure: the annotation is omitted and the backup proceeds.
const BACKUP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Resource kinds this action should be invoked for.
pub fn applies_to() -> ResourceSelector {
    ResourceSelector {
        included_resources: vec![CLUSTER_RESOURCE.to_string()],
    }
}

/// Execute the backup action on a Cluster document.
///
/// Clusters without a discoverable `serverName` plugin parameter are not
/// using the backup plugin and are returned unchanged. On any error the
/// caller keeps its original document.
pub async fn execute<C: ClusterOps>(
    doc: &Value,
    parent: Option<&OperationDescriptor>,
    ops: &C,
) -> Result<Value> {
    info!(
        resource = actions::resource_name(doc),
        backup = parent.and_then(|p| p.name.as_deref()),
        "executing CNPG backup action"
    );

    let params = extract_plugin_parameters(doc)?;
    let Some(server_name) = params.server_name.filter(|name| !name.is_empty()) else {
        info!("no serverName found in plugin parameters, skipping annotation");
        return Ok(doc.clone());
    };

    let mut out = doc.clone();
    annotations::set(&mut out, ANNOTATION_SERVER_NAME, &server_name)?;
    info!(server_name = %server_name, "annotated cluster with server identity");

    if let Some(barman_object_name) = params.barman_object_name.filter(|name| !name.is_empty()) {
        annotations::set(&mut out, ANNOTATION_BARMAN_OBJECT_NAME, &barman_object_name)?;
        info!(barman_object_name = %barman_object_name, "annotated cluster with storage location");
    }

    annotate_latest_backup_id(&mut out, ops).await;

    Ok(out)
}

/// Best-effort: resolve and stamp the latest completed backup ID. Every
/// failure mode here is logged and swallowed; the identity annotation
/// alone is enough for a restore to latest.
async fn annotate_latest_backup_id<C: ClusterOps>(doc: &mut Value, ops: &C) {
    let Some(namespace) = actions::resource_namespace(doc).map(str::to_string) else {
        warn!("cluster has no namespace, skipping backup ID lookup");
        return;
    };
    let cluster_name = match doc
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
    {
        Some(name) => name.to_string(),
        None => {
            warn!("cluster has no name, skipping backup ID lookup");
            return;
        }
    };

    let lookup = latest_completed_backup_id(ops, &namespace, &cluster_name);
    match tokio::time::timeout(BACKUP_LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(Some(backup_id))) => {
            match annotations::set(doc, ANNOTATION_CURRENT_BACKUP_ID, &backup_id) {
                Ok(()) => info!(backup_id = %backup_id, "annotated cluster with backup ID"),
                Err(e) => warn!(error = %e, "failed to annotate backup ID"),
            }
        }
        Ok(Ok(None)) => warn!("no completed backups found for cluster"),
        Ok(Err(e)) => warn!(error = %e, "failed to get latest backup ID"),
        Err(_) => warn!(
            timeout_secs = BACKUP_LOOKUP_TIMEOUT.as_secs(),
            "backup ID lookup timed out"
        ),
    }
}
