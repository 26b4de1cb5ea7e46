//! Restore-phase item action for CNPG Cluster resources
//!
//! Consumes the annotations stamped at backup time and hands back a
//! document rewritten to recover from the external backup archive under a
//! freshly minted server identity. Clusters without the identity
//! annotation were not backed up with this protocol and pass through
//! unchanged.

use serde_json::Value;
use tracing::{info, warn};

use crate::actions::{self, CLUSTER_RESOURCE, OperationDescriptor, ResourceSelector};
use crate::api::ClusterOps;
use crate::cluster::override_map::publish_identity_override;
use crate::cluster::rewrite::rewrite_for_recovery;
use crate::error::Result;

/// Resource kinds this action should be invoked for.
pub fn applies_to() -> ResourceSelector {
    ResourceSelector {
        included_resources: vec![CLUSTER_RESOURCE.to_string()],
    }
}

/// Execute the restore action on a Cluster document.
///
/// On success the returned document is configured for recovery; on any
/// error the caller keeps its original document untouched. The identity
/// override publication is best-effort and never fails the restore.
pub async fn execute<C: ClusterOps>(
    doc: &Value,
    parent: Option<&OperationDescriptor>,
    ops: &C,
) -> Result<Value> {
    info!(
        resource = actions::resource_name(doc),
        restore = parent.and_then(|p| p.name.as_deref()),
        "executing CNPG restore action"
    );

    let Some(rewrite) = rewrite_for_recovery(doc)? else {
        info!("no recovery annotation found, skipping restore modifications");
        return Ok(doc.clone());
    };

    match actions::resource_namespace(doc) {
        Some(namespace) => {
            if let Err(e) = publish_identity_override(
                ops,
                namespace,
                &rewrite.new_server_name,
                &rewrite.original_server_name,
            )
            .await
            {
                warn!(error = %e, "failed to publish identity override, continuing restore");
            }
        }
        None => warn!("cluster has no namespace, skipping identity override"),
    }

    info!(
        original = %rewrite.original_server_name,
        new = %rewrite.new_server_name,
        backup_id = rewrite.backup_id.as_deref(),
        "configured cluster for recovery from backup"
    );
    Ok(rewrite.document)
}
