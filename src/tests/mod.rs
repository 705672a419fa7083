mod resources;

use crate::{
    ApiClient, ProviderSession, ProxmoxAuth, ProxmoxCSRFToken, ProxmoxTicket, ProxmoxUrl,
    core::infrastructure::api_client::build_http_client,
};
use std::num::NonZeroUsize;
use wiremock::MockServer;

pub(crate) const TEST_TICKET: &str = "PVE:testuser@pam:4EEC61E2::sig==";
pub(crate) const TEST_CSRF: &str = "4EEC61E2:token";

/// A session against `mock_server` that skips the login exchange.
pub(crate) fn create_authenticated_session(
    mock_server: &MockServer,
    max_parallel: usize,
) -> ProviderSession {
    let auth = ProxmoxAuth::new(
        ProxmoxTicket::new_unchecked(TEST_TICKET.to_string()),
        ProxmoxCSRFToken::new_unchecked(TEST_CSRF.to_string()),
    );
    let api_client = ApiClient::new(
        build_http_client(false).unwrap(),
        ProxmoxUrl::parse(&mock_server.uri()).unwrap(),
        auth,
        None,
    );
    ProviderSession::new(api_client, NonZeroUsize::new(max_parallel).unwrap())
}
