//! Annotation codec for the backup/restore metadata protocol
//!
//! Annotations on the cluster resource are the only durable channel
//! between the backup phase and the restore phase: the backup action
//! stamps the original server identity (and, when discoverable, the
//! storage-location name and the latest completed backup ID), and the
//! restore action reads them back to decide whether and how to rewrite
//! the spec. One fixed namespace is used by both sides; diverging here
//! breaks the protocol silently.

use serde_json::Value;

use crate::document::accessor;
use crate::error::{Error, Result};

/// Annotation carrying the server identity the backed-up cluster wrote
/// its WAL stream under. Its presence marks the resource as recoverable.
pub const ANNOTATION_SERVER_NAME: &str = "velero-cnpg/serverName";

/// Annotation carrying the barman object store configuration name the
/// backup was written to. Stamped at backup time; the restore-time
/// canonical source for the storage location.
pub const ANNOTATION_BARMAN_OBJECT_NAME: &str = "velero-cnpg/barmanObjectName";

/// Annotation carrying the ID of the latest completed backup at backup
/// time, for point-in-time recovery targeting. Best-effort and optional.
pub const ANNOTATION_CURRENT_BACKUP_ID: &str = "velero-cnpg/current-backup-id";

/// Read an annotation from the document's metadata.
///
/// A genuinely absent `metadata` or `annotations` block is `Ok(None)`;
/// either existing with the wrong shape is a structural error.
pub fn get(doc: &Value, key: &str) -> Result<Option<String>> {
    let root = accessor::as_object(doc, "resource")?;
    let Some(metadata) = accessor::optional_object(root, "metadata")? else {
        return Ok(None);
    };
    let Some(annotations) = accessor::optional_object(metadata, "annotations")? else {
        return Ok(None);
    };
    match annotations.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(Error::MalformedResource(format!(
            "annotation {key} is not a string"
        ))),
    }
}

/// Write an annotation into the document's metadata.
///
/// Creates the `annotations` mapping on demand and merges the key in
/// without disturbing existing keys. A missing or non-mapping `metadata`
/// is a structural error; a resource without metadata has no identity to
/// annotate.
pub fn set(doc: &mut Value, key: &str, value: &str) -> Result<()> {
    let root = accessor::as_object_mut(doc, "resource")?;
    let metadata = match root.get_mut("metadata") {
        Some(metadata) => accessor::as_object_mut(metadata, "metadata")?,
        None => {
            return Err(Error::MalformedResource(
                "metadata field not found".to_string(),
            ));
        }
    };
    let annotations = metadata
        .entry("annotations")
        .or_insert_with(|| Value::Object(Default::default()));
    let annotations = accessor::as_object_mut(annotations, "annotations")?;
    annotations.insert(key.to_string(), Value::String(value.to_string()));
    Ok(())
}
