//! Host-facing item actions
//!
//! Each action is an `execute`-shaped function over a resource document
//! plus an `applies_to()` selector the host consults at registration. The
//! transport between host and action (process registration, RPC framing,
//! progress/cancel callbacks) is the host's concern; nothing here holds
//! state between invocations, so the host may run actions on independent
//! resources in parallel.

pub mod backup;
pub mod deployment;
pub mod restore;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource kind the cluster-oriented actions apply to
pub const CLUSTER_RESOURCE: &str = "clusters.postgresql.cnpg.io";

/// Resource kind the deployment action applies to
pub const DEPLOYMENT_RESOURCE: &str = "deployments";

/// Declares which resource kinds an action should be invoked for.
///
/// Entries may be bare resources or resources with group names
/// (`deployments`, `clusters.postgresql.cnpg.io`). An empty selector
/// matches all resources.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResourceSelector {
    pub included_resources: Vec<String>,
}

/// Parent backup/restore descriptor the host passes alongside the item.
/// Only used for log correlation; the actions derive everything they need
/// from the resource document itself.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OperationDescriptor {
    /// Name of the parent Backup or Restore object
    pub name: Option<String>,
}

impl OperationDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Best-effort read of `metadata.name` for log context.
pub(crate) fn resource_name(doc: &Value) -> &str {
    doc.get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
}

/// Best-effort read of `metadata.namespace`.
pub(crate) fn resource_namespace(doc: &Value) -> Option<&str> {
    doc.get("metadata")
        .and_then(|m| m.get("namespace"))
        .and_then(Value::as_str)
}
