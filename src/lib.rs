//! Velero item-action core for CloudNativePG clusters
//!
//! Backing up a CNPG Cluster resource as plain YAML is not enough to
//! restore it: reapplying the spec would bootstrap an empty database.
//! This crate carries the knowledge needed to do better, in two halves:
//!
//! - At backup time, the cluster's backup-plugin parameters (server
//!   identity and barman object store name) are stamped onto the resource
//!   as annotations, along with the ID of the latest completed backup
//!   when one can be found.
//! - At restore time, those annotations drive a spec rewrite: the
//!   bootstrap block becomes a recovery from an external cluster pointing
//!   at the original identity, while the cluster's own plugin identity is
//!   rotated to a fresh one so the restored instance cannot collide with
//!   the source's backup stream.
//!
//! The host orchestrator's plugin transport is out of scope; the crate
//! exposes pure `execute`-shaped functions (see [`actions`]) plus the
//! resource-kind selectors the host registers them under. Live-cluster
//! access is injected through [`ClusterOps`] so everything is testable
//! without an API server.

pub mod actions;
pub mod api;
pub mod cluster;
pub mod crd;
pub mod document;
pub mod error;

pub use actions::{OperationDescriptor, ResourceSelector};
pub use api::{ClusterOps, KubeClusterOps};
pub use error::{Error, Result};
