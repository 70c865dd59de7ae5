use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TenancyDomainError {
    #[error("tenant credential is required")]
    MissingTenantCredential,

    #[error("tenant credential is invalid")]
    InvalidToken,

    #[error("tenant id is invalid; use [A-Za-z0-9_-] and length 1..63")]
    InvalidTenantId,

    #[error("tenant is not provisioned")]
    UnknownTenant,

    #[error("tenant database connection failed: {0}")]
    ConnectionError(String),

    #[error("model registration failed: {0}")]
    RegistrationError(String),

    #[error("tenant connection was not ready after {0} ms")]
    Timeout(u64),

    #[error("model is not registered: {0}")]
    UnknownModel(String),

    #[error("connection template must contain {{tenant}} and use a [A-Za-z0-9_-] prefix")]
    InvalidConnectionTemplate,

    #[error("infrastructure error: {0}")]
    InfrastructureError(String),
}

impl TenancyDomainError {
    /// Errors after which the registry entry is discarded and a later request may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionError(_) | Self::RegistrationError(_) | Self::Timeout(_)
        )
    }
}
