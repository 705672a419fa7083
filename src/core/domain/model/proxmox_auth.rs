use crate::core::domain::value_object::{ProxmoxCSRFToken, ProxmoxTicket};

/// Credentials obtained from a single successful login.
///
/// Both tokens are non-empty by construction; the value is never mutated
/// after login and lives as long as the provider session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxAuth {
    ticket: ProxmoxTicket,
    csrf_token: ProxmoxCSRFToken,
}

impl ProxmoxAuth {
    pub fn new(ticket: ProxmoxTicket, csrf_token: ProxmoxCSRFToken) -> Self {
        Self { ticket, csrf_token }
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &ProxmoxCSRFToken {
        &self.csrf_token
    }
}
