//! Error types for the CNPG item actions

use thiserror::Error;

/// Error variants are split along the fatal/soft boundary the actions rely
/// on: structural shape violations and broken annotation preconditions abort
/// the current invocation, while Kubernetes API failures are classified by
/// the caller (fatal on required paths, logged and omitted on best-effort
/// paths).
#[derive(Error, Debug)]
pub enum Error {
    /// A required structural field is absent or has the wrong shape.
    /// Always fatal to the current invocation, never retried.
    #[error("malformed resource: {0}")]
    MalformedResource(String),

    /// An annotation-derived precondition was violated: the resource is
    /// marked for recovery but the dependent data cannot be resolved.
    #[error("missing backup metadata: {0}")]
    MissingBackupMetadata(String),

    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
