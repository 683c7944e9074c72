//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// protocol-level data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The join code is not 4–6 ASCII alphanumeric characters.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// The message passed deserialization but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
