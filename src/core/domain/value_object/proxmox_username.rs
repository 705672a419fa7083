use crate::core::domain::error::ValidationError;

/// A validated Proxmox username, usually carrying its realm (`user@pam`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Creates a new username without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Creates a validated username.
    pub fn new(username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        validate_username(&username)?;
        Ok(Self(username))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a username.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.chars().count() > 64 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 64 characters (got {})",
            username.chars().count()
        )));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::Format(
            "Username cannot contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("root@pam").is_ok());
        assert!(validate_username("terraform@pve").is_ok());
        assert!(validate_username("john.doe").is_ok());
    }

    #[test]
    fn test_validate_username_invalid() {
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
        assert!(validate_username("user name@pam").is_err());
        assert!(validate_username("user\t@pam").is_err());
    }

    #[test]
    fn test_username_new_unchecked() {
        let username = ProxmoxUsername::new_unchecked("test".to_string());
        assert_eq!(username.as_str(), "test");
    }
}
