//! Latest-completed-backup resolution
//!
//! At backup time the cluster is additionally annotated with the ID of
//! its most recent completed CNPG Backup, so a later restore can target a
//! precise recovery point instead of "latest available". The lookup is
//! best-effort: an empty answer is normal (no backups yet, none
//! completed, none for this cluster) and only API failures propagate.

use tracing::{info, warn};

use crate::api::ClusterOps;
use crate::crd::Backup;

/// Resolve the backup ID of the most recent completed backup for
/// `cluster_name` in `namespace`. `Ok(None)` when there is none.
pub async fn latest_completed_backup_id<C: ClusterOps>(
    ops: &C,
    namespace: &str,
    cluster_name: &str,
) -> kube::Result<Option<String>> {
    let backups = ops.list_backups(namespace).await?;
    if backups.is_empty() {
        warn!(namespace, "no backup resources found in namespace");
        return Ok(None);
    }
    Ok(select_latest_completed(backups, cluster_name))
}

/// Pure selection over an already-fetched backup list: filter to
/// completed backups of `cluster_name`, order by creation timestamp
/// descending, and return the newest one's status-reported backup ID.
pub fn select_latest_completed(backups: Vec<Backup>, cluster_name: &str) -> Option<String> {
    let mut completed: Vec<Backup> = backups
        .into_iter()
        .filter(|backup| backup.spec.cluster.name == cluster_name && backup.is_completed())
        .collect();

    if completed.is_empty() {
        warn!(cluster = cluster_name, "no completed backups found for cluster");
        return None;
    }

    completed.sort_by(|a, b| {
        let a = a.metadata.creation_timestamp.as_ref().map(|t| t.0);
        let b = b.metadata.creation_timestamp.as_ref().map(|t| t.0);
        b.cmp(&a)
    });

    let latest = &completed[0];
    let backup_id = latest.status.as_ref().and_then(|s| s.backup_id.clone());
    match &backup_id {
        Some(id) => info!(
            backup = ?latest.metadata.name,
            backup_id = %id,
            "found latest completed backup"
        ),
        None => warn!(
            backup = ?latest.metadata.name,
            "latest completed backup reports no backup ID"
        ),
    }
    backup_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{BACKUP_PHASE_COMPLETED, BackupSpec, BackupStatus, ClusterObjectReference};
    use chrono::{TimeZone, Utc};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use kube::core::ObjectMeta;

    fn backup(
        name: &str,
        cluster: &str,
        phase: Option<&str>,
        backup_id: Option<&str>,
        day: u32,
    ) -> Backup {
        Backup {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                creation_timestamp: Some(Time(Utc.with_ymd_and_hms(2025, 1, day, 2, 0, 0).unwrap())),
                ..Default::default()
            },
            spec: BackupSpec {
                cluster: ClusterObjectReference {
                    name: cluster.to_string(),
                },
            },
            status: phase.map(|phase| BackupStatus {
                phase: Some(phase.to_string()),
                backup_id: backup_id.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_empty_list_yields_none() {
        assert_eq!(select_latest_completed(Vec::new(), "pg"), None);
    }

    #[test]
    fn test_other_clusters_and_incomplete_backups_are_ignored() {
        let backups = vec![
            backup("b1", "other", Some(BACKUP_PHASE_COMPLETED), Some("x"), 1),
            backup("b2", "pg", Some("running"), Some("y"), 2),
            backup("b3", "pg", None, Some("z"), 3),
        ];
        assert_eq!(select_latest_completed(backups, "pg"), None);
    }

    #[test]
    fn test_newest_completed_backup_wins() {
        let backups = vec![
            backup("old", "pg", Some(BACKUP_PHASE_COMPLETED), Some("id-old"), 1),
            backup("new", "pg", Some(BACKUP_PHASE_COMPLETED), Some("id-new"), 9),
            backup("mid", "pg", Some(BACKUP_PHASE_COMPLETED), Some("id-mid"), 5),
        ];
        assert_eq!(
            select_latest_completed(backups, "pg"),
            Some("id-new".to_string())
        );
    }

    #[test]
    fn test_latest_without_id_yields_none() {
        let backups = vec![backup("b", "pg", Some(BACKUP_PHASE_COMPLETED), None, 1)];
        assert_eq!(select_latest_completed(backups, "pg"), None);
    }
}
