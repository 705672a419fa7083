use crate::core::domain::error::ValidationError;
use std::fmt;

/// A Proxmox authentication ticket.
///
/// Sent back to the cluster as the `PVEAuthCookie` session cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxmoxTicket(String);

impl ProxmoxTicket {
    /// Creates a new ticket without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Creates a validated ticket.
    pub(crate) fn new(value: String) -> Result<Self, ValidationError> {
        validate_ticket(&value)?;
        Ok(Self(value))
    }

    /// Returns the ticket value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the ticket as a cookie header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.0)
    }
}

impl fmt::Debug for ProxmoxTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProxmoxTicket(<redacted>)")
    }
}

/// Validates a ticket string received from the login endpoint.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "ticket".to_string(),
            message: "Ticket cannot be empty".to_string(),
        });
    }
    Ok(())
}
