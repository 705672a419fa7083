use crate::core::domain::error::ValidationError;
use url::Url;

const MAX_URL_LENGTH: usize = 2083;
const API_ROOT: &str = "/api2/json";

/// A validated Proxmox API root URL.
///
/// Accepts either the bare origin (`https://pve.example.com:8006`) or the
/// API root (`https://pve.example.com:8006/api2/json`), with or without a
/// trailing slash, and always stores the API root form.
///
/// # Examples
///
/// ```
/// use proxmox_pool_provider::ProxmoxUrl;
///
/// let url = ProxmoxUrl::parse("https://pve.example.com:8006").unwrap();
/// assert_eq!(url.as_str(), "https://pve.example.com:8006/api2/json");
///
/// let pool = url.endpoint(&["pools", "dev"]);
/// assert_eq!(pool.as_str(), "https://pve.example.com:8006/api2/json/pools/dev");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl {
    api_root: Url,
}

impl ProxmoxUrl {
    /// Parses and normalizes an API URL.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        validate_url(raw)?;

        let mut url = Url::parse(raw)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
        url.set_query(None);
        url.set_fragment(None);

        let path = url.path().trim_end_matches('/').to_string();
        let prefix = path.strip_suffix(API_ROOT).unwrap_or(&path);
        url.set_path(&format!("{}{}", prefix, API_ROOT));

        Ok(Self { api_root: url })
    }

    /// Returns the API root as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.api_root.as_str()
    }

    /// Builds the URL of an API endpoint below the root. Each segment is
    /// percent-encoded, so user-supplied identifiers cannot escape their
    /// path position.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Validates a raw API URL.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "api_url".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: https, http",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::ConstraintViolation(
            "URL must contain a host".to_string(),
        ));
    }
    Ok(())
}
