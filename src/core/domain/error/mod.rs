use thiserror::Error;

/// The main error type for provider operations.
///
/// This enum represents all possible errors that can occur while
/// configuring the provider session and running resource operations
/// against a Proxmox VE cluster.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// Represents transport-level failures (unreachable host, TLS failure,
    /// unreadable response body)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the exchange
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents authentication failures
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents a failure to obtain a fresh VM identifier from the cluster
    ///
    /// # Fields
    /// * `0` - A description of why allocation failed
    #[error("Allocation error: {0}")]
    Allocation(String),

    /// Represents a non-success answer from the Proxmox API
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the cluster
    /// * `message` - The response body or status text
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl From<ValidationError> for ProxmoxError {
    fn from(error: ValidationError) -> Self {
        ProxmoxError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
