use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Phase value a CNPG Backup reports once it has finished successfully.
pub const BACKUP_PHASE_COMPLETED: &str = "completed";

/// Partial schema for the CloudNativePG Backup custom resource.
///
/// The Backup CRD is owned by the CNPG operator; we only decode the
/// fields the backup-ID resolver needs (which cluster the backup belongs
/// to, whether it completed, and the ID it was stored under). Everything
/// else is ignored on deserialization.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "postgresql.cnpg.io",
    version = "v1",
    kind = "Backup",
    plural = "backups",
    namespaced,
    status = "BackupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct BackupSpec {
    /// The cluster this backup was taken from
    pub cluster: ClusterObjectReference,
}

/// Reference to the cluster a backup belongs to
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterObjectReference {
    /// Name of the cluster resource
    pub name: String,
}

/// Observed state of a CNPG Backup
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct BackupStatus {
    /// Lifecycle phase (e.g., "started", "running", "completed", "failed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Identifier the backup was stored under in the object store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<String>,
}

impl Backup {
    /// Whether this backup finished successfully.
    pub fn is_completed(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .is_some_and(|phase| phase == BACKUP_PHASE_COMPLETED)
    }
}
