//! Error types for RBAC operations

use thiserror::Error;

/// Result type for RBAC operations
pub type RbacResult<T> = Result<T, RbacError>;

/// RBAC-specific errors
///
/// None of these are produced by the authorization check itself: a missing
/// actor or an unknown scope token is a denial, not an error.
#[derive(Error, Debug)]
pub enum RbacError {
    /// Authorizer built without an identity provider
    #[error("Authorizer requires an identity provider; none was configured")]
    MissingIdentityProvider,

    /// Scope token outside the closed scope set
    #[error("Unknown scope token: {token}")]
    UnknownScope { token: String },

    /// Role name outside the closed role set
    #[error("Unknown role: {role_name}")]
    UnknownRole { role_name: String },

    /// Registry definition could not be parsed or validated
    #[error("Invalid registry: {message}")]
    InvalidRegistry { message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Failed to read a registry file
    #[error("Failed to read registry file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RbacError {
    /// Create a new unknown scope error
    pub fn unknown_scope(token: impl Into<String>) -> Self {
        Self::UnknownScope { token: token.into() }
    }

    /// Create a new unknown role error
    pub fn unknown_role(role_name: impl Into<String>) -> Self {
        Self::UnknownRole {
            role_name: role_name.into(),
        }
    }

    /// Create a new invalid registry error
    pub fn invalid_registry(message: impl Into<String>) -> Self {
        Self::InvalidRegistry {
            message: message.into(),
        }
    }

    /// Create a new invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error comes from an unparseable token
    pub fn is_unknown_token(&self) -> bool {
        matches!(self, Self::UnknownScope { .. } | Self::UnknownRole { .. })
    }

    /// Check if this error is a setup mistake that should abort startup
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingIdentityProvider | Self::InvalidConfig { .. } | Self::InvalidRegistry { .. }
        )
    }
}
