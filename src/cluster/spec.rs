//! Typed sub-shapes of the Cluster spec the rewriter synthesizes
//!
//! The Cluster resource itself stays an untyped document (it is owned by
//! the CNPG operator and we must not drop fields we do not understand),
//! but everything this crate writes wholesale (the external-cluster
//! reference and the bootstrap block) is built from these structs and
//! encoded at the document boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the external cluster entry the rewritten bootstrap recovers from
pub const RECOVERY_SOURCE_NAME: &str = "clusterBackup";

/// Identifier of the CNPG barman-cloud plugin that owns the object store
pub const BARMAN_PLUGIN_NAME: &str = "barman-cloud.cloudnative-pg.io";

/// Plugin parameter key holding the server identity
pub const PARAM_SERVER_NAME: &str = "serverName";

/// Plugin parameter key holding the barman object store configuration name
pub const PARAM_BARMAN_OBJECT_NAME: &str = "barmanObjectName";

/// A `spec.plugins[]` / `spec.externalClusters[].plugin` configuration block
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
    /// Plugin identifier
    pub name: String,

    /// Plugin-specific string parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// A `spec.externalClusters[]` entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCluster {
    /// Name the bootstrap recovery source refers to
    pub name: String,

    /// Plugin configuration pointing at the backup location
    pub plugin: PluginConfiguration,
}

impl ExternalCluster {
    /// Build the `clusterBackup` entry referencing the ORIGINAL server
    /// identity (the read source) and the extracted storage location.
    pub fn backup_source(original_server_name: &str, barman_object_name: &str) -> Self {
        Self {
            name: RECOVERY_SOURCE_NAME.to_string(),
            plugin: PluginConfiguration {
                name: BARMAN_PLUGIN_NAME.to_string(),
                parameters: BTreeMap::from([
                    (
                        PARAM_BARMAN_OBJECT_NAME.to_string(),
                        barman_object_name.to_string(),
                    ),
                    (
                        PARAM_SERVER_NAME.to_string(),
                        original_server_name.to_string(),
                    ),
                ]),
            },
        }
    }
}

/// The `spec.bootstrap` block as rewritten for recovery
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfiguration {
    /// Recovery-from-source bootstrap; replaces any prior `initdb`
    pub recovery: RecoveryConfiguration,
}

impl BootstrapConfiguration {
    /// Bootstrap recovering from the `clusterBackup` external cluster,
    /// targeting a specific backup when an ID is available.
    pub fn recovery(backup_id: Option<String>) -> Self {
        Self {
            recovery: RecoveryConfiguration {
                source: RECOVERY_SOURCE_NAME.to_string(),
                recovery_target: backup_id.map(|backup_id| RecoveryTarget { backup_id }),
            },
        }
    }
}

/// The `spec.bootstrap.recovery` block
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryConfiguration {
    /// Named external cluster to recover from
    pub source: String,

    /// Optional point-in-time target; absent means latest available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_target: Option<RecoveryTarget>,
}

/// A recovery target pinned to a specific backup
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecoveryTarget {
    /// Backup ID as reported by the CNPG Backup status
    #[serde(rename = "backupID")]
    pub backup_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_source_references_original_identity() {
        let external = ExternalCluster::backup_source("cnpg-1", "store-a");
        assert_eq!(
            serde_json::to_value(&external).unwrap(),
            json!({
                "name": "clusterBackup",
                "plugin": {
                    "name": "barman-cloud.cloudnative-pg.io",
                    "parameters": {
                        "barmanObjectName": "store-a",
                        "serverName": "cnpg-1"
                    }
                }
            })
        );
    }

    #[test]
    fn test_bootstrap_recovery_without_target() {
        let bootstrap = BootstrapConfiguration::recovery(None);
        assert_eq!(
            serde_json::to_value(&bootstrap).unwrap(),
            json!({"recovery": {"source": "clusterBackup"}})
        );
    }

    #[test]
    fn test_bootstrap_recovery_with_target() {
        let bootstrap = BootstrapConfiguration::recovery(Some("20251013T135400".to_string()));
        assert_eq!(
            serde_json::to_value(&bootstrap).unwrap(),
            json!({
                "recovery": {
                    "source": "clusterBackup",
                    "recoveryTarget": {"backupID": "20251013T135400"}
                }
            })
        );
    }
}
