//! Message validation rules.

use chathub_core::error::AppError;

/// Validates the raw size and content of an inbound frame before decoding.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_inbound() {
        assert!(validate_inbound(r#"{"type":"broadcast"}"#, 64).is_ok());
        assert!(validate_inbound("   ", 64).is_err());
        assert!(validate_inbound(&"x".repeat(65), 64).is_err());
    }
}
