use thiserror::Error;

use crate::providers::ProviderError;
use crate::providers::consul::ConsulError;
use crate::resource::SchemaError;
use crate::terraform::StateError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Consul(#[from] ConsulError),

    #[error("invalid configuration: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("drift detected in {count} ACL(s)")]
    Drift { count: usize },
}
