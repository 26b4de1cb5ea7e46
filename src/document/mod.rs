//! Semi-structured resource document access
//!
//! Item actions receive resources as untyped JSON documents (the host
//! serializes whatever object kind matched the selector). This module is
//! the only place that walks those documents by hand: `accessor` provides
//! typed, error-returning field access, and `annotations` implements the
//! metadata annotation codec that carries state from backup time to
//! restore time.

pub mod accessor;
pub mod annotations;

pub use annotations::{
    ANNOTATION_BARMAN_OBJECT_NAME, ANNOTATION_CURRENT_BACKUP_ID, ANNOTATION_SERVER_NAME,
};
