use crate::core::domain::model::proxmox_connection::ProxmoxConnection;
use std::num::{NonZeroU32, NonZeroUsize};

/// Default bound on concurrent in-flight API operations.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

/// Environment variables the provider reads its defaults from.
pub mod env {
    pub const API_URL: &str = "PM_API_URL";
    pub const USER: &str = "PM_USER";
    pub const PASSWORD: &str = "PM_PASS";
    pub const OTP: &str = "PM_OTP";
    pub const OTP_PROMPT: &str = "PM_OTP_PROMPT";
    pub const TLS_INSECURE: &str = "PM_TLS_INSECURE";
    pub const PARALLEL: &str = "PM_PARALLEL";
}

/// Request pacing applied to every authenticated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst_size: NonZeroU32,
}

/// Validated provider configuration, ready for login.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    connection: ProxmoxConnection,
    max_parallel: NonZeroUsize,
    rate_limit: Option<RateLimitConfig>,
}

impl ProviderConfig {
    pub fn new(
        connection: ProxmoxConnection,
        max_parallel: NonZeroUsize,
        rate_limit: Option<RateLimitConfig>,
    ) -> Self {
        Self {
            connection,
            max_parallel,
            rate_limit,
        }
    }

    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    pub fn max_parallel(&self) -> NonZeroUsize {
        self.max_parallel
    }

    pub fn rate_limit(&self) -> Option<RateLimitConfig> {
        self.rate_limit
    }
}
