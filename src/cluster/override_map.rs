//! Identity continuity record for restored clusters
//!
//! After a restore rotates the server identity, templated consumers in
//! the namespace (Helm charts rendering the cluster, monitoring, etc.)
//! need to know both sides of the rotation: which identity to write new
//! backups under and which one the archive is readable from. That pair is
//! published as a small ConfigMap, upserted idempotently so repeated
//! restore cycles converge on the latest mapping.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::ObjectMeta;
use tracing::info;

use crate::api::ClusterOps;

/// Name of the per-namespace identity override ConfigMap
pub const OVERRIDE_CONFIG_MAP_NAME: &str = "cnpg-velero-override";

/// Data key holding the restored cluster's new (write) identity
pub const KEY_WRITE_SERVER_NAME: &str = "write_to_server_name";

/// Data key holding the original (read) identity
pub const KEY_READ_SERVER_NAME: &str = "read_from_server_name";

/// Build the identity override ConfigMap for a namespace.
///
/// The `helm.sh/resource-policy: keep` annotation stops chart uninstalls
/// and upgrades from deleting the record out from under consumers.
pub fn identity_override_config_map(
    namespace: &str,
    new_server_name: &str,
    original_server_name: &str,
) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(OVERRIDE_CONFIG_MAP_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                "helm.sh/resource-policy".to_string(),
                "keep".to_string(),
            )])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([
            (
                KEY_WRITE_SERVER_NAME.to_string(),
                new_server_name.to_string(),
            ),
            (
                KEY_READ_SERVER_NAME.to_string(),
                original_server_name.to_string(),
            ),
        ])),
        ..Default::default()
    }
}

/// Upsert the identity override ConfigMap into `namespace`.
///
/// Safe to retry and safe under concurrent restores of the same cluster:
/// the content is a pure function of the inputs, so last writer wins.
pub async fn publish_identity_override<C: ClusterOps>(
    ops: &C,
    namespace: &str,
    new_server_name: &str,
    original_server_name: &str,
) -> kube::Result<()> {
    let config_map = identity_override_config_map(namespace, new_server_name, original_server_name);
    ops.apply_config_map(namespace, OVERRIDE_CONFIG_MAP_NAME, &config_map)
        .await?;
    info!(
        namespace,
        name = OVERRIDE_CONFIG_MAP_NAME,
        write = new_server_name,
        read = original_server_name,
        "published identity override"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_map_shape() {
        let cm = identity_override_config_map("prod", "pg-20250101-020000", "cnpg-1");

        assert_eq!(cm.metadata.name.as_deref(), Some(OVERRIDE_CONFIG_MAP_NAME));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(
            cm.metadata
                .annotations
                .as_ref()
                .unwrap()
                .get("helm.sh/resource-policy")
                .map(String::as_str),
            Some("keep")
        );

        let data = cm.data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.get(KEY_WRITE_SERVER_NAME).map(String::as_str),
            Some("pg-20250101-020000")
        );
        assert_eq!(
            data.get(KEY_READ_SERVER_NAME).map(String::as_str),
            Some("cnpg-1")
        );
    }
}
