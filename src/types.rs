// Error types shared across the bootstrap layer

use aws_credential_types::provider::error::CredentialsError;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Unsupported service kind: {0}")]
    UnsupportedServiceKind(String),

    /// Raised at first use, never by `create_client`.
    #[error("Credential resolution failed for {service}: {source}")]
    CredentialResolution {
        service: &'static str,
        #[source]
        source: CredentialsError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Client handle is bound to {actual}, not {expected}")]
    ServiceMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

pub type BootstrapResult<T> = std::result::Result<T, BootstrapError>;
