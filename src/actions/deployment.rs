//! Restore-phase item action for Deployments
//!
//! Restored application deployments must not wait for a migration job
//! that already ran in the source cluster and is not recreated by the
//! restore, so the corresponding init container is dropped from the pod
//! template. This is a plain filter: malformed or absent fields are a
//! no-op, never an error.

use serde_json::Value;
use tracing::{info, warn};

use crate::actions::{self, DEPLOYMENT_RESOURCE, OperationDescriptor, ResourceSelector};

/// Name of the init container that waits for migration jobs
pub const MIGRATION_INIT_CONTAINER_NAME: &str = "wait-for-migration-job";

/// Resource kinds this action should be invoked for.
pub fn applies_to() -> ResourceSelector {
    ResourceSelector {
        included_resources: vec![DEPLOYMENT_RESOURCE.to_string()],
    }
}

/// Execute the deployment restore action: remove every init container
/// named [`MIGRATION_INIT_CONTAINER_NAME`] from the pod template. When
/// none remain, the `initContainers` field is removed entirely rather
/// than left as an empty list.
pub fn execute(doc: &Value, parent: Option<&OperationDescriptor>) -> Value {
    info!(
        resource = actions::resource_name(doc),
        restore = parent.and_then(|p| p.name.as_deref()),
        "executing deployment restore action"
    );

    let mut out = doc.clone();

    let Some(pod_spec) = out
        .get_mut("spec")
        .and_then(|spec| spec.get_mut("template"))
        .and_then(|template| template.get_mut("spec"))
        .and_then(Value::as_object_mut)
    else {
        info!("no pod template spec found in deployment, skipping");
        return out;
    };

    let Some(init_containers) = pod_spec.get("initContainers") else {
        info!("no initContainers found in deployment, skipping");
        return out;
    };
    let Some(init_containers) = init_containers.as_array() else {
        warn!("initContainers is not a list, skipping");
        return out;
    };

    let filtered: Vec<Value> = init_containers
        .iter()
        .filter(|container| {
            container
                .get("name")
                .and_then(Value::as_str)
                .is_none_or(|name| name != MIGRATION_INIT_CONTAINER_NAME)
        })
        .cloned()
        .collect();

    let removed = init_containers.len() - filtered.len();
    if removed == 0 {
        info!(
            container = MIGRATION_INIT_CONTAINER_NAME,
            "no matching init containers found, deployment unchanged"
        );
        return out;
    }

    if filtered.is_empty() {
        pod_spec.remove("initContainers");
    } else {
        pod_spec.insert("initContainers".to_string(), Value::Array(filtered));
    }
    info!(
        removed,
        container = MIGRATION_INIT_CONTAINER_NAME,
        "removed migration init containers from deployment"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment(init_containers: Value) -> Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "app", "namespace": "default"},
            "spec": {"template": {"spec": {
                "initContainers": init_containers,
                "containers": [{"name": "app"}]
            }}}
        })
    }

    #[test]
    fn test_filters_sentinel_init_containers() {
        let doc = deployment(json!([
            {"name": "wait-for-migration-job", "image": "busybox"},
            {"name": "other-init", "image": "busybox"},
            {"name": "wait-for-migration-job", "image": "busybox:1.36"}
        ]));
        let out = execute(&doc, None);

        let remaining = out["spec"]["template"]["spec"]["initContainers"]
            .as_array()
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["name"], json!("other-init"));
    }

    #[test]
    fn test_removes_field_when_no_containers_remain() {
        let doc = deployment(json!([{"name": "wait-for-migration-job"}]));
        let out = execute(&doc, None);
        assert!(
            out["spec"]["template"]["spec"]
                .get("initContainers")
                .is_none()
        );
        // Main containers are untouched.
        assert_eq!(
            out["spec"]["template"]["spec"]["containers"][0]["name"],
            json!("app")
        );
    }

    #[test]
    fn test_unnamed_and_malformed_containers_are_kept() {
        let doc = deployment(json!([
            {"image": "no-name"},
            "not-a-map",
            {"name": 42},
            {"name": "wait-for-migration-job"}
        ]));
        let out = execute(&doc, None);
        let remaining = out["spec"]["template"]["spec"]["initContainers"]
            .as_array()
            .unwrap();
        assert_eq!(remaining.len(), 3);
    }

    #[test]
    fn test_absent_init_containers_is_a_noop() {
        let doc = json!({
            "metadata": {"name": "app"},
            "spec": {"template": {"spec": {"containers": [{"name": "app"}]}}}
        });
        assert_eq!(execute(&doc, None), doc);
    }

    #[test]
    fn test_malformed_init_containers_is_a_noop() {
        let doc = deployment(json!("nope"));
        assert_eq!(execute(&doc, None), doc);
    }

    #[test]
    fn test_no_match_leaves_deployment_unchanged() {
        let doc = deployment(json!([{"name": "other-init"}]));
        assert_eq!(execute(&doc, None), doc);
    }
}
