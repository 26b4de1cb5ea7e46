//! Backup-plugin parameter extraction from the Cluster spec
//!
//! The barman-cloud plugin block in `spec.plugins[]` carries the two
//! values the metadata protocol needs: the server identity the cluster
//! backs up under and the object store configuration name. Extraction
//! attributes both to a single block (the first one in document order
//! that defines either) and never merges values across blocks, so a
//! resource with several plugin entries yields a deterministic answer.

use serde_json::Value;
use tracing::debug;

use crate::cluster::spec::{PARAM_BARMAN_OBJECT_NAME, PARAM_SERVER_NAME};
use crate::document::accessor;
use crate::error::Result;

/// Backup-plugin parameters recovered from a Cluster spec
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedParameters {
    /// `parameters.serverName`, when present and string-typed
    pub server_name: Option<String>,

    /// `parameters.barmanObjectName`, when present and string-typed
    pub barman_object_name: Option<String>,
}

/// Extract `serverName` and `barmanObjectName` from `spec.plugins[]`.
///
/// A missing or non-mapping `spec` is a structural error; a missing
/// `plugins` list is not (the resource simply isn't using the backup
/// plugin) and yields empty values. Individual blocks with unexpected
/// shapes are skipped, not fatal.
pub fn extract_plugin_parameters(doc: &Value) -> Result<ExtractedParameters> {
    let root = accessor::as_object(doc, "resource")?;
    let spec = match root.get("spec") {
        Some(spec) => accessor::as_object(spec, "spec")?,
        None => {
            return Err(crate::error::Error::MalformedResource(
                "spec field not found".to_string(),
            ));
        }
    };

    let Some(plugins) = accessor::optional_list(spec, "plugins")? else {
        debug!("no plugins found in spec");
        return Ok(ExtractedParameters::default());
    };

    for block in plugins {
        let Some(block) = block.as_object() else {
            continue;
        };
        let Some(parameters) = block.get("parameters").and_then(Value::as_object) else {
            continue;
        };

        let extracted = ExtractedParameters {
            server_name: parameters
                .get(PARAM_SERVER_NAME)
                .and_then(Value::as_str)
                .map(str::to_string),
            barman_object_name: parameters
                .get(PARAM_BARMAN_OBJECT_NAME)
                .and_then(Value::as_str)
                .map(str::to_string),
        };

        // First block defining either value wins outright; later blocks
        // are ignored even if they define the same keys.
        if extracted.server_name.is_some() || extracted.barman_object_name.is_some() {
            return Ok(extracted);
        }
    }

    Ok(ExtractedParameters::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_missing_spec_is_malformed() {
        let doc = json!({"metadata": {"name": "pg"}});
        let err = extract_plugin_parameters(&doc).unwrap_err();
        assert!(matches!(err, Error::MalformedResource(_)));
    }

    #[test]
    fn test_non_mapping_spec_is_malformed() {
        let doc = json!({"spec": ["not", "a", "map"]});
        assert!(extract_plugin_parameters(&doc).is_err());
    }

    #[test]
    fn test_absent_plugins_yields_empty() {
        let doc = json!({"spec": {"instances": 3}});
        assert_eq!(
            extract_plugin_parameters(&doc).unwrap(),
            ExtractedParameters::default()
        );
    }

    #[test]
    fn test_non_list_plugins_is_malformed() {
        let doc = json!({"spec": {"plugins": {"name": "x"}}});
        assert!(extract_plugin_parameters(&doc).is_err());
    }

    #[test]
    fn test_extracts_both_values_from_one_block() {
        let doc = json!({"spec": {"plugins": [{
            "name": "barman-cloud.cloudnative-pg.io",
            "parameters": {"serverName": "cnpg-1", "barmanObjectName": "store-a"}
        }]}});
        let params = extract_plugin_parameters(&doc).unwrap();
        assert_eq!(params.server_name.as_deref(), Some("cnpg-1"));
        assert_eq!(params.barman_object_name.as_deref(), Some("store-a"));
    }

    #[test]
    fn test_first_populated_block_wins() {
        let doc = json!({"spec": {"plugins": [
            {"name": "metrics", "parameters": {"interval": "30s"}},
            {"name": "barman", "parameters": {"serverName": "first"}},
            {"name": "other", "parameters": {"serverName": "second", "barmanObjectName": "late"}}
        ]}});
        let params = extract_plugin_parameters(&doc).unwrap();
        assert_eq!(params.server_name.as_deref(), Some("first"));
        // barmanObjectName from a later block is NOT merged in.
        assert_eq!(params.barman_object_name, None);
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let doc = json!({"spec": {"plugins": [
            "not-a-map",
            {"name": "no-params"},
            {"name": "bad-params", "parameters": "nope"},
            {"name": "barman", "parameters": {"serverName": 42, "barmanObjectName": "store-a"}}
        ]}});
        let params = extract_plugin_parameters(&doc).unwrap();
        // Non-string serverName is ignored; the string-typed value in the
        // same block still attributes the block.
        assert_eq!(params.server_name, None);
        assert_eq!(params.barman_object_name.as_deref(), Some("store-a"));
    }
}
