//! JSON encoding and decoding for WebSocket frames.

use serde::Serialize;

use chathub_core::result::AppResult;

use super::types::Message;

/// Serialize any outbound payload to a text frame.
pub fn encode<T: Serialize>(payload: &T) -> AppResult<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Deserialize an inbound text frame.
pub fn decode(text: &str) -> AppResult<Message> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use chathub_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_decode_rejects_non_object() {
        assert_eq!(decode("[1,2]").unwrap_err().kind, ErrorKind::Serialization);
        assert_eq!(decode("not json").unwrap_err().kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_decode_rejects_mistyped_field() {
        let err = decode(r#"{"type":"private","receiverId":"two"}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }
}
