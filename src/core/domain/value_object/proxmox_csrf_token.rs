use crate::core::domain::error::ValidationError;
use std::fmt;

/// A Proxmox CSRF protection token.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxCSRFToken(String);

impl ProxmoxCSRFToken {
    /// Header name the cluster expects the token under.
    pub const HEADER: &'static str = "CSRFPreventionToken";

    /// Creates a new CSRF token without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Creates a validated CSRF token.
    pub(crate) fn new(value: String) -> Result<Self, ValidationError> {
        validate_csrf_token(&value)?;
        Ok(Self(value))
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProxmoxCSRFToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxCSRFToken(<redacted>)")
    }
}

/// Validates a CSRF token string received from the login endpoint.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "csrf_token".to_string(),
            message: "CSRF token cannot be empty".to_string(),
        });
    }
    Ok(())
}
