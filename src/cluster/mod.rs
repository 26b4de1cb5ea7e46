//! CNPG cluster resource domain logic
//!
//! Everything that understands the Cluster spec dialect lives here:
//! extracting backup-plugin parameters, minting restored-server
//! identities, rewriting a spec into a recover-from-backup configuration,
//! resolving the latest completed backup ID, and publishing the identity
//! continuity record.

pub mod backups;
pub mod identity;
pub mod override_map;
pub mod params;
pub mod rewrite;
pub mod spec;

pub use backups::{latest_completed_backup_id, select_latest_completed};
pub use override_map::{OVERRIDE_CONFIG_MAP_NAME, publish_identity_override};
pub use params::{ExtractedParameters, extract_plugin_parameters};
pub use rewrite::{RecoveryRewrite, rewrite_for_recovery};
