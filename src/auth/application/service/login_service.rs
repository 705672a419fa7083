use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::domain::{
        error::{ProxmoxError, ProxmoxResult, ValidationError},
        model::{proxmox_auth::ProxmoxAuth, proxmox_connection::ProxmoxConnection},
        value_object::{ProxmoxCSRFToken, ProxmoxTicket},
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};

/// Performs the one login exchange of a provider session.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// Exchanges the connection's credentials for a ticket and CSRF token.
    ///
    /// # Errors
    ///
    /// - `ProxmoxError::Connection` if the cluster cannot be reached or the
    ///   body cannot be read.
    /// - `ProxmoxError::Authentication` if the credentials are rejected or
    ///   the response carries no ticket or no CSRF token.
    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &ProxmoxConnection,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let url = connection.proxmox_url().endpoint(&["access", "ticket"]);
        let request = LoginRequest {
            username: connection.proxmox_username().as_str(),
            password: connection.proxmox_password().as_str(),
            otp: connection.proxmox_otp().map(|otp| otp.as_str()),
        };

        tracing::debug!(
            username = request.username,
            otp = request.otp.is_some(),
            "requesting ticket"
        );

        let response = http_client
            .post(url)
            .headers(self.default_headers.clone())
            .form(&request)
            .send()
            .await
            .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

        match response.status() {
            status if status.is_success() => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                ProxmoxError::Authentication("Invalid credentials provided".to_string()),
            ),
            StatusCode::BAD_REQUEST => Err(ValidationError::Field {
                field: "request".to_string(),
                message: "Invalid request format".to_string(),
            }
            .into()),
            StatusCode::NOT_FOUND => Err(ProxmoxError::Connection(
                "Login endpoint not found".to_string(),
            )),
            StatusCode::SERVICE_UNAVAILABLE => Err(ProxmoxError::Connection(
                "Proxmox service is currently unavailable".to_string(),
            )),
            status => Err(ProxmoxError::Connection(format!(
                "Unexpected response status: {}",
                status
            ))),
        }
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let body = response.text().await.map_err(|e| {
            ProxmoxError::Connection(format!("Failed to read login response: {}", e))
        })?;
        let login_response = serde_json::from_str::<LoginResponse>(&body).map_err(|e| {
            ProxmoxError::Connection(format!("Failed to parse login response: {}", e))
        })?;
        let data = login_response.data.unwrap_or_default();

        let ticket = data
            .ticket
            .and_then(|ticket| ProxmoxTicket::new(ticket).ok())
            .ok_or_else(|| ProxmoxError::Authentication("no ticket received".to_string()))?;
        let csrf_token = data
            .csrf_token
            .and_then(|token| ProxmoxCSRFToken::new(token).ok())
            .ok_or_else(|| {
                ProxmoxError::Authentication("no CSRF prevention token received".to_string())
            })?;

        Ok(ProxmoxAuth::new(ticket, csrf_token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
