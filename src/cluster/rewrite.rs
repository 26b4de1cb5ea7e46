//! Restore-time spec rewriting
//!
//! Converts a Cluster resource from "bootstrap a fresh database" to
//! "recover from the external backup archive" using the metadata stamped
//! at backup time. The rewrite rotates the cluster's own server identity
//! to a freshly minted one (the write target going forward) while the
//! synthesized external cluster keeps the ORIGINAL identity (the read
//! source); swapping the two would point recovery at an empty stream and
//! let the restored cluster clobber the source's backups.
//!
//! All fallible resolution happens before the input document is cloned,
//! so every error path hands the caller back an untouched resource.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cluster::identity;
use crate::cluster::params::extract_plugin_parameters;
use crate::cluster::spec::{BootstrapConfiguration, ExternalCluster, PARAM_SERVER_NAME};
use crate::document::accessor;
use crate::document::annotations::{
    self, ANNOTATION_BARMAN_OBJECT_NAME, ANNOTATION_CURRENT_BACKUP_ID, ANNOTATION_SERVER_NAME,
};
use crate::error::{Error, Result};

/// Metadata fields owned by the cluster runtime that must never be
/// replayed into a restored resource.
const EPHEMERAL_METADATA_FIELDS: [&str; 5] = [
    "resourceVersion",
    "uid",
    "generation",
    "creationTimestamp",
    "managedFields",
];

/// Outcome of a successful recovery rewrite
#[derive(Clone, Debug)]
pub struct RecoveryRewrite {
    /// The rewritten resource document
    pub document: Value,

    /// Identity the source cluster backed up under (the read source)
    pub original_server_name: String,

    /// Freshly minted identity for the restored cluster (the write target)
    pub new_server_name: String,

    /// Specific backup the recovery targets, when one was recorded
    pub backup_id: Option<String>,
}

/// Rewrite a Cluster document into a recover-from-backup configuration.
///
/// Returns `Ok(None)` when the resource carries no original-identity
/// annotation: it was not backed up with this protocol and must not be
/// touched. Otherwise the returned document has its ephemeral fields
/// stripped, its plugin server identity rotated, and its
/// `externalClusters` and `bootstrap` blocks replaced wholesale.
pub fn rewrite_for_recovery(doc: &Value) -> Result<Option<RecoveryRewrite>> {
    let Some(original_server_name) = annotations::get(doc, ANNOTATION_SERVER_NAME)? else {
        debug!(
            annotation = ANNOTATION_SERVER_NAME,
            "no recovery annotation found, leaving resource untouched"
        );
        return Ok(None);
    };

    // The storage location is inseparable from the identity annotation: a
    // recovery source without an object store to read from is meaningless.
    let barman_object_name = resolve_barman_object_name(doc)?.ok_or_else(|| {
        Error::MissingBackupMetadata(format!(
            "resource is annotated with {ANNOTATION_SERVER_NAME} but no barmanObjectName \
             could be resolved from annotations or plugin parameters"
        ))
    })?;

    let backup_id = annotations::get(doc, ANNOTATION_CURRENT_BACKUP_ID)?;

    let cluster_name = resource_name(doc)?.ok_or_else(|| {
        Error::MalformedResource("cluster name not found in metadata".to_string())
    })?;
    let new_server_name = identity::generate(&cluster_name);
    info!(
        cluster = %cluster_name,
        original = %original_server_name,
        new = %new_server_name,
        "minted new server identity for restored cluster"
    );

    let mut document = doc.clone();
    strip_ephemeral_fields(&mut document);

    let rotated = rotate_plugin_server_names(&mut document, &new_server_name)?;
    if rotated == 0 {
        warn!("no serverName found in any plugin parameters, nothing rotated");
    }

    let spec = {
        let root = accessor::as_object_mut(&mut document, "resource")?;
        match root.get_mut("spec") {
            Some(spec) => accessor::as_object_mut(spec, "spec")?,
            None => return Err(Error::MalformedResource("spec field not found".to_string())),
        }
    };

    spec.insert(
        "externalClusters".to_string(),
        serde_json::to_value(vec![ExternalCluster::backup_source(
            &original_server_name,
            &barman_object_name,
        )])?,
    );

    // Recovery always supersedes fresh bootstrap; any prior initdb block
    // is discarded with the rest of the old bootstrap configuration.
    spec.insert(
        "bootstrap".to_string(),
        serde_json::to_value(BootstrapConfiguration::recovery(backup_id.clone()))?,
    );

    Ok(Some(RecoveryRewrite {
        document,
        original_server_name,
        new_server_name,
        backup_id,
    }))
}

/// Resolve the storage-location name: the annotation stamped at backup
/// time is canonical, with live-spec extraction as a fallback for
/// resources annotated by the earlier protocol revision.
fn resolve_barman_object_name(doc: &Value) -> Result<Option<String>> {
    if let Some(name) = annotations::get(doc, ANNOTATION_BARMAN_OBJECT_NAME)?
        && !name.is_empty()
    {
        return Ok(Some(name));
    }
    let params = extract_plugin_parameters(doc)?;
    Ok(params.barman_object_name.filter(|name| !name.is_empty()))
}

/// Read `metadata.name` from the document.
fn resource_name(doc: &Value) -> Result<Option<String>> {
    let root = accessor::as_object(doc, "resource")?;
    let Some(metadata) = accessor::optional_object(root, "metadata")? else {
        return Ok(None);
    };
    Ok(accessor::optional_str(metadata, "name")?.map(str::to_string))
}

/// Remove status and runtime-owned metadata fields.
///
/// Unconditional on the rewrite path: these fields belong to the cluster
/// runtime that created the original resource and must not survive into
/// the restored one, whether or not recovery configuration follows.
pub fn strip_ephemeral_fields(doc: &mut Value) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };
    root.remove("status");
    if let Some(metadata) = root.get_mut("metadata").and_then(Value::as_object_mut) {
        for field in EPHEMERAL_METADATA_FIELDS {
            metadata.remove(field);
        }
    }
}

/// Rotate `parameters.serverName` to `new_server_name` in every plugin
/// block that already declares the key. The key is never added to blocks
/// without it. Returns how many blocks were rotated.
fn rotate_plugin_server_names(doc: &mut Value, new_server_name: &str) -> Result<usize> {
    let root = accessor::as_object_mut(doc, "resource")?;
    let spec = match root.get_mut("spec") {
        Some(spec) => accessor::as_object_mut(spec, "spec")?,
        None => return Err(Error::MalformedResource("spec field not found".to_string())),
    };

    let Some(plugins) = accessor::optional_list_mut(spec, "plugins")? else {
        debug!("no plugins found in spec, skipping serverName rotation");
        return Ok(0);
    };

    let mut rotated = 0;
    for block in plugins {
        let Some(parameters) = block
            .as_object_mut()
            .and_then(|block| block.get_mut("parameters"))
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        if let Some(server_name) = parameters.get_mut(PARAM_SERVER_NAME) {
            *server_name = Value::String(new_server_name.to_string());
            rotated += 1;
        }
    }

    Ok(rotated)
}
