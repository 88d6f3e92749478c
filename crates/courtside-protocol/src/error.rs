//! Error types for the protocol layer.
//!
//! Each crate in Courtside defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of a message
//! (serialization, a missing token), not in networking or in the
//! session.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the server changed a field name, sent HTML from a
    /// proxy error page, or truncated the body.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but breaks a protocol rule, e.g. an
    /// empty access token or a non-bearer token type.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
