//! JSON serialization for WebSocket frames.

use serde::Serialize;

use examhub_core::error::AppError;

use super::types::{ClientEvent, ServerEvent};

/// Serialize any event into a text frame.
pub fn encode<T: Serialize>(event: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(event)?)
}

/// Decode a frame received by a client.
pub fn decode_server(text: &str) -> Result<ServerEvent, AppError> {
    serde_json::from_str(text)
        .map_err(|e| AppError::serialization(format!("Malformed server frame: {e}")))
}

/// Decode a frame received by the status service.
pub fn decode_client(text: &str) -> Result<ClientEvent, AppError> {
    serde_json::from_str(text)
        .map_err(|e| AppError::serialization(format!("Malformed client frame: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use examhub_core::error::ErrorKind;

    #[test]
    fn test_decode_server_rejects_garbage() {
        let err = decode_server("not json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_decode_server_requires_type() {
        assert!(decode_server(r#"{"title":"x"}"#).is_err());
    }

    #[test]
    fn test_decode_client_unknown_type_is_error() {
        assert!(decode_client(r#"{"type":"teleport"}"#).is_err());
    }
}
