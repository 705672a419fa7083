use crate::core::domain::error::ValidationError;
use std::fmt;

/// A Proxmox password (plaintext, only kept for the login exchange).
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxPassword(String);

impl ProxmoxPassword {
    /// Creates a new password without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Creates a validated password.
    pub fn new(password: impl Into<String>) -> Result<Self, ValidationError> {
        let password = password.into();
        validate_password(&password)?;
        Ok(Self(password))
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProxmoxPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxPassword(<redacted>)")
    }
}

/// Validates a password. The cluster owns the password policy; only
/// emptiness is rejected locally.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    Ok(())
}
