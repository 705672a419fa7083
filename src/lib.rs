//! Session and concurrency core of a Terraform provider managing Proxmox VE
//! resource pools.
//!
//! A [`ProviderSession`] is built once per provider configuration: it logs
//! in, keeps the resulting ticket and CSRF token, bounds the number of
//! concurrent API operations and hands out fresh VM ids. Resource handlers
//! borrow it for every operation.

mod auth;
mod core;
mod pool;

#[cfg(test)]
mod tests;

pub use crate::core::domain::error::{ProxmoxError, ProxmoxResult, ValidationError};
pub use crate::core::domain::model::{
    pool::PoolState,
    provider_config::{DEFAULT_MAX_PARALLEL, ProviderConfig, RateLimitConfig, env},
    proxmox_auth::ProxmoxAuth,
    proxmox_connection::ProxmoxConnection,
    resource_id::{ResourceId, decode_resource_id, encode_resource_id},
};
pub use crate::core::domain::value_object::{
    ProxmoxCSRFToken, ProxmoxOtp, ProxmoxPassword, ProxmoxTicket, ProxmoxUrl, ProxmoxUsername,
};
pub use crate::core::infrastructure::{
    admission_limiter::{AdmissionLimiter, AdmissionPermit},
    api_client::{ApiClient, ApiResponse},
    vmid_allocator::{NextIdSource, VmIdAllocator},
};
pub use crate::pool::application::service::pool_service::PoolService;

use crate::{
    auth::application::service::login_service::LoginService,
    core::infrastructure::api_client::build_http_client,
};
use std::num::{NonZeroU32, NonZeroUsize};

/// Entry point for configuring the provider.
///
/// # Examples
///
/// ```no_run
/// use proxmox_pool_provider::{PoolState, ProxmoxProvider, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let session = ProxmoxProvider::builder()
///         .api_url("https://pve.example.com:8006/api2/json")
///         .credentials("terraform@pve", "password")
///         .tls_insecure(true)
///         .max_parallel(4)
///         .configure()
///         .await?;
///
///     let mut pool = PoolState::planned("dev", "development VMs");
///     session.pools().create(&mut pool).await?;
///     Ok(())
/// }
/// ```
pub struct ProxmoxProvider;

impl ProxmoxProvider {
    /// Creates a new builder for the provider configuration
    pub fn builder() -> ProxmoxProviderBuilder {
        ProxmoxProviderBuilder::default()
    }
}

/// Builder for the provider configuration.
///
/// Values set explicitly win over the environment; see
/// [`ProxmoxProviderBuilder::from_env`].
#[derive(Default)]
pub struct ProxmoxProviderBuilder {
    api_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    otp: Option<String>,
    require_otp: bool,
    tls_insecure: Option<bool>,
    max_parallel: Option<usize>,
    rate_limit: Option<(u32, u32)>,
}

impl ProxmoxProviderBuilder {
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }

    /// Makes a missing OTP code a configuration error.
    pub fn require_otp(mut self, require: bool) -> Self {
        self.require_otp = require;
        self
    }

    /// Disables certificate verification for every request of the session.
    pub fn tls_insecure(mut self, insecure: bool) -> Self {
        self.tls_insecure = Some(insecure);
        self
    }

    /// Maximum number of concurrent API operations (default 4).
    pub fn max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel);
        self
    }

    /// Paces every authenticated request in addition to the admission limit.
    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.rate_limit = Some((requests_per_second, burst_size));
        self
    }

    /// Fills unset values from the `PM_*` process environment.
    pub fn from_env(self) -> ProxmoxResult<Self> {
        self.from_env_with(|name| std::env::var(name).ok())
    }

    /// Fills unset values using `lookup` to resolve `PM_*` variables.
    /// Empty variables count as unset.
    pub fn from_env_with<F>(mut self, lookup: F) -> ProxmoxResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if self.api_url.is_none() {
            self.api_url = var(env::API_URL);
        }
        if self.username.is_none() {
            self.username = var(env::USER);
        }
        if self.password.is_none() {
            self.password = var(env::PASSWORD);
        }
        if self.otp.is_none() {
            self.otp = var(env::OTP);
        }
        if var(env::OTP_PROMPT).as_deref() == Some("1") {
            self.require_otp = true;
        }
        if self.tls_insecure.is_none() {
            if let Some(raw) = var(env::TLS_INSECURE) {
                self.tls_insecure = Some(parse_flag(env::TLS_INSECURE, &raw)?);
            }
        }
        if self.max_parallel.is_none() {
            if let Some(raw) = var(env::PARALLEL) {
                let parsed = raw.trim().parse::<usize>().map_err(|_| ValidationError::Field {
                    field: env::PARALLEL.to_string(),
                    message: format!("'{}' is not a non-negative integer", raw),
                })?;
                self.max_parallel = Some(parsed);
            }
        }

        Ok(self)
    }

    /// Validates the configuration without contacting the cluster.
    pub fn build(self) -> ProxmoxResult<ProviderConfig> {
        let api_url = ProxmoxUrl::parse(&required(self.api_url, "api_url", "API URL is required")?)?;
        let username =
            ProxmoxUsername::new(required(self.username, "username", "Username is required")?)?;
        let password =
            ProxmoxPassword::new(required(self.password, "password", "Password is required")?)?;

        let otp = match self.otp {
            Some(code) => ProxmoxOtp::parse(&code)?,
            None => None,
        };
        if self.require_otp && otp.is_none() {
            return Err(ValidationError::Field {
                field: "otp".to_string(),
                message: "OTP code is required".to_string(),
            }
            .into());
        }

        let max_parallel = NonZeroUsize::new(self.max_parallel.unwrap_or(DEFAULT_MAX_PARALLEL))
            .ok_or_else(|| ValidationError::Field {
                field: "max_parallel".to_string(),
                message: "Max parallel must be at least 1".to_string(),
            })?;

        let rate_limit = match self.rate_limit {
            Some((requests_per_second, burst_size)) => Some(RateLimitConfig {
                requests_per_second: non_zero(requests_per_second, "requests_per_second")?,
                burst_size: non_zero(burst_size, "burst_size")?,
            }),
            None => None,
        };

        let connection = ProxmoxConnection::new(
            api_url,
            username,
            password,
            otp,
            self.tls_insecure.unwrap_or(false),
        );
        Ok(ProviderConfig::new(connection, max_parallel, rate_limit))
    }

    /// Validates the configuration and logs in.
    pub async fn configure(self) -> ProxmoxResult<ProviderSession> {
        configure(self.build()?).await
    }
}

fn required(value: Option<String>, field: &str, message: &str) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: message.to_string(),
    })
}

fn non_zero(value: u32, field: &str) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: "must be greater than zero".to_string(),
    })
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ValidationError::Field {
            field: field.to_string(),
            message: format!("'{}' is not a boolean", raw),
        }),
    }
}

/// Logs in and builds the session for one provider configuration.
///
/// # Errors
///
/// Any error here is fatal to provider configuration: no resource
/// operation can run without a session.
pub async fn configure(config: ProviderConfig) -> ProxmoxResult<ProviderSession> {
    let connection = config.connection();
    let http_client = build_http_client(connection.tls_insecure())?;
    let auth = LoginService::new().execute(&http_client, connection).await?;

    tracing::info!(
        api_url = connection.proxmox_url().as_str(),
        username = connection.proxmox_username().as_str(),
        max_parallel = config.max_parallel().get(),
        "provider session configured"
    );

    let api_client = ApiClient::new(
        http_client,
        connection.proxmox_url().clone(),
        auth,
        config.rate_limit(),
    );
    Ok(ProviderSession::new(api_client, config.max_parallel()))
}

/// State shared by every resource operation of one provider configuration.
#[derive(Debug)]
pub struct ProviderSession {
    api_client: ApiClient,
    limiter: AdmissionLimiter,
    allocator: VmIdAllocator,
}

impl ProviderSession {
    pub fn new(api_client: ApiClient, max_parallel: NonZeroUsize) -> Self {
        Self {
            api_client,
            limiter: AdmissionLimiter::new(max_parallel),
            allocator: VmIdAllocator::new(),
        }
    }

    /// Waits for an admission slot; the slot is released when the permit
    /// is dropped.
    pub async fn acquire(&self) -> AdmissionPermit<'_> {
        self.limiter.acquire().await
    }

    /// Allocates a VM id strictly greater than any returned before in this
    /// session.
    pub async fn next_vm_id(&self) -> ProxmoxResult<u32> {
        self.allocator.next_id(&self.api_client).await
    }

    /// Handlers of the pool resource.
    pub fn pools(&self) -> PoolService<'_> {
        PoolService::new(&self.api_client, &self.limiter)
    }

    pub fn api_client(&self) -> &ApiClient {
        &self.api_client
    }

    pub fn limiter(&self) -> &AdmissionLimiter {
        &self.limiter
    }

    pub fn auth(&self) -> &ProxmoxAuth {
        self.api_client.auth()
    }
}
