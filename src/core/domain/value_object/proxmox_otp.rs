use crate::core::domain::error::ValidationError;

/// A one-time password for clusters with two-factor authentication enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxOtp(String);

impl ProxmoxOtp {
    /// Parses an optional OTP code. Blank input means "no OTP configured".
    pub fn parse(code: &str) -> Result<Option<Self>, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        validate_otp(code)?;
        Ok(Some(Self(code.to_string())))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn validate_otp(code: &str) -> Result<(), ValidationError> {
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::Format(
            "OTP code must be alphanumeric".to_string(),
        ));
    }
    Ok(())
}
