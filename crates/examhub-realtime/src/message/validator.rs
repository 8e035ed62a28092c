//! Frame validation rules.

use examhub_core::error::AppError;

/// Validates a raw inbound frame before decoding.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
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
    fn test_limits() {
        assert!(validate_frame(r#"{"type":"request_stats"}"#, 64).is_ok());
        assert!(validate_frame("   ", 64).is_err());
        assert!(validate_frame(&"x".repeat(65), 64).is_err());
    }
}
