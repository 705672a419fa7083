use crate::core::domain::error::ValidationError;

/// Validates a resource pool identifier before it is sent to the cluster.
///
/// Proxmox accepts letters, digits, `-`, `_` and `.` in pool ids.
pub(crate) fn validate_pool_id(pool_id: &str) -> Result<(), ValidationError> {
    if pool_id.is_empty() {
        return Err(ValidationError::Field {
            field: "poolid".to_string(),
            message: "Pool id cannot be empty".to_string(),
        });
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.';
    if !pool_id.chars().all(allowed) {
        return Err(ValidationError::Format(format!(
            "Pool id '{}' contains invalid characters. Allowed: alphanumeric, -, _, .",
            pool_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pool_id() {
        assert!(validate_pool_id("dev").is_ok());
        assert!(validate_pool_id("team-a_prod.1").is_ok());
        assert!(validate_pool_id("").is_err());
        assert!(validate_pool_id("a/b").is_err());
        assert!(validate_pool_id("with space").is_err());
    }
}
