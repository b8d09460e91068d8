use thiserror::Error;

/// Consul-specific errors that can occur during ACL API operations.
///
/// SECURITY: Error messages must NEVER contain the ACL token used for the request.
#[derive(Debug, Error)]
pub enum ConsulError {
    /// Consul answered with a non-200 status.
    #[error("Unexpected response code: {status} ({message})")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// `/v1/acl/info` returned no entry for the identifier
    #[error("ACL not found: '{id}'")]
    AclNotFound { id: String },

    /// Body of a successful response could not be decoded
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("invalid token format")]
    InvalidToken,

    #[error("invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },
}

impl ConsulError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConsulError::AclNotFound { .. })
    }
}
