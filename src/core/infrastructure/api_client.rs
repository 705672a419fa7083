//! Internal HTTP client that injects the session credentials into every request.

use crate::core::{
    domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{provider_config::RateLimitConfig, proxmox_auth::ProxmoxAuth},
        value_object::{ProxmoxCSRFToken, ProxmoxUrl},
    },
    infrastructure::vmid_allocator::NextIdSource,
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header::COOKIE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Lowest VM id the cluster hands out.
const MIN_VM_ID: u32 = 100;
/// Upper bound on consecutive "id taken" answers before giving up.
const MAX_NEXTID_PROBES: u32 = 256;

/// Builds the HTTP client shared by login and every later request.
///
/// With `tls_insecure` set, certificate verification is disabled for all
/// requests of this client.
pub(crate) fn build_http_client(tls_insecure: bool) -> ProxmoxResult<Client> {
    Client::builder()
        .danger_accept_invalid_certs(tls_insecure)
        .build()
        .map_err(|e| ProxmoxError::Connection(e.to_string()))
}

/// Raw answer of the cluster: status plus body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

impl ApiResponse {
    /// Fails with `ProxmoxError::Api` unless the status is a success.
    pub fn error_for_status(self) -> ProxmoxResult<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        let message = if self.body.trim().is_empty() {
            self.status
                .canonical_reason()
                .unwrap_or("unknown")
                .to_string()
        } else {
            self.body
        };
        Err(ProxmoxError::Api {
            status: self.status.as_u16(),
            message,
        })
    }

    /// Checks the status and decodes the `data` member of the JSON body.
    pub fn into_data<T>(self) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.error_for_status()?;
        serde_json::from_str::<ApiEnvelope<T>>(&response.body)
            .map(|envelope| envelope.data)
            .map_err(|e| ProxmoxError::Connection(format!("Failed to parse response: {}", e)))
    }
}

/// Session client: the authenticated view of one cluster.
///
/// Every request carries the `PVEAuthCookie` cookie and the
/// `CSRFPreventionToken` header from the login. Tickets are not refreshed;
/// once one expires the cluster answers 401 and the error reaches the caller.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    api_url: ProxmoxUrl,
    auth: ProxmoxAuth,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl ApiClient {
    pub fn new(
        http_client: Client,
        api_url: ProxmoxUrl,
        auth: ProxmoxAuth,
        rate_limit: Option<RateLimitConfig>,
    ) -> Self {
        let rate_limiter = rate_limit.map(|rl| {
            let quota = Quota::per_second(rl.requests_per_second).allow_burst(rl.burst_size);
            DefaultDirectRateLimiter::direct(quota)
        });

        Self {
            http_client,
            api_url,
            auth,
            rate_limiter,
        }
    }

    pub fn api_url(&self) -> &ProxmoxUrl {
        &self.api_url
    }

    pub fn auth(&self) -> &ProxmoxAuth {
        &self.auth
    }

    /// Starts a request to the endpoint below the API root named by
    /// `segments`, with both credential headers already attached. Callers
    /// add query or form data and hand it to [`ApiClient::send`].
    pub fn new_authenticated_request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http_client
            .request(method, self.api_url.endpoint(segments))
            .header(COOKIE, self.auth.ticket().as_cookie_header())
            .header(ProxmoxCSRFToken::HEADER, self.auth.csrf_token().as_str())
    }

    /// Dispatches a request and reads the whole body. Non-success statuses
    /// are returned as-is so callers can inspect them.
    pub async fn send(&self, request: RequestBuilder) -> ProxmoxResult<ApiResponse> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let request = request
            .build()
            .map_err(|e| ProxmoxError::Connection(format!("Invalid request: {}", e)))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "sending API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ProxmoxError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProxmoxError::Connection(format!("Failed to read response: {}", e)))?;
        tracing::debug!(%method, %path, status = status.as_u16(), "received API response");

        Ok(ApiResponse { status, body })
    }

    /// Performs an authenticated GET and decodes `data`.
    pub async fn get<T>(&self, segments: &[&str]) -> ProxmoxResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.new_authenticated_request(Method::GET, segments);
        self.send(request).await?.into_data()
    }

    /// Performs an authenticated POST with a form body.
    pub async fn post_form<F>(&self, segments: &[&str], form: &F) -> ProxmoxResult<()>
    where
        F: Serialize + ?Sized,
    {
        let request = self
            .new_authenticated_request(Method::POST, segments)
            .form(form);
        self.send(request).await?.error_for_status().map(drop)
    }

    /// Performs an authenticated PUT with a form body.
    pub async fn put_form<F>(&self, segments: &[&str], form: &F) -> ProxmoxResult<()>
    where
        F: Serialize + ?Sized,
    {
        let request = self
            .new_authenticated_request(Method::PUT, segments)
            .form(form);
        self.send(request).await?.error_for_status().map(drop)
    }

    /// Performs an authenticated DELETE.
    pub async fn delete(&self, segments: &[&str]) -> ProxmoxResult<()> {
        let request = self.new_authenticated_request(Method::DELETE, segments);
        self.send(request).await?.error_for_status().map(drop)
    }
}

/// `data` of `/cluster/nextid`; the cluster sends the id as a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum NextIdData {
    Text(String),
    Number(u32),
}

impl NextIdData {
    fn into_id(self) -> ProxmoxResult<u32> {
        match self {
            NextIdData::Number(id) => Ok(id),
            NextIdData::Text(text) => text.trim().parse().map_err(|_| {
                ProxmoxError::Allocation(format!("cluster returned a non-numeric VM id '{}'", text))
            }),
        }
    }
}

#[async_trait]
impl NextIdSource for ApiClient {
    /// Asks `/cluster/nextid` for a free id. The cluster answers 400 when
    /// the requested start is taken, so the search advances one id at a time.
    async fn next_free_id(&self, start: Option<u32>) -> ProxmoxResult<u32> {
        let mut candidate = start.filter(|id| *id >= MIN_VM_ID);

        for _ in 0..MAX_NEXTID_PROBES {
            let mut request = self.new_authenticated_request(Method::GET, &["cluster", "nextid"]);
            if let Some(id) = candidate {
                request = request.query(&[("vmid", id)]);
            }

            let response = self.send(request).await?;
            if response.status == StatusCode::BAD_REQUEST {
                let Some(taken) = candidate else {
                    return Err(ProxmoxError::Allocation(format!(
                        "cluster rejected next id query: {}",
                        response.body
                    )));
                };
                tracing::debug!(vmid = taken, "VM id taken, probing next");
                candidate = Some(taken.checked_add(1).ok_or_else(|| {
                    ProxmoxError::Allocation("VM id space exhausted".to_string())
                })?);
                continue;
            }

            return response.into_data::<NextIdData>()?.into_id();
        }

        Err(ProxmoxError::Allocation(format!(
            "no free VM id found after {} probes starting at {:?}",
            MAX_NEXTID_PROBES, start
        )))
    }
}
