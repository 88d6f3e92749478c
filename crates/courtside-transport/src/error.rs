use courtside_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
///
/// HTTP status codes are folded into a handful of classes so the layers
/// above can react without knowing about HTTP: an `Unauthorized` means
/// "the credential is dead", a `Rejected` means "the server understood
/// and said no", everything else is "try again later".
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server refused the credential (401 or 403).
    #[error("unauthorized (status {status})")]
    Unauthorized { status: u16 },

    /// The server rejected the request (any other 4xx).
    #[error("request rejected (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The server failed to handle the request (5xx).
    #[error("server error (status {status}): {detail}")]
    Server { status: u16, detail: String },

    /// The request never got an answer: connect failure, timeout, or a
    /// body that stopped halfway.
    #[error("network failure: {0}")]
    Network(String),

    /// The body could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] ProtocolError),

    /// The configured base URL or an endpoint path is not a valid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Classifies a non-success HTTP status.
    ///
    /// `detail` is the server's explanation if the body carried one.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| format!("status {status}"));
        match status {
            401 | 403 => Self::Unauthorized { status },
            400..=499 => Self::Rejected { status, detail },
            _ => Self::Server { status, detail },
        }
    }

    /// Returns `true` if the credential used for the call is no longer
    /// accepted.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns the HTTP status, for errors that came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status }
            | Self::Rejected { status, .. }
            | Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Codec(_) | Self::InvalidUrl(_) => None,
        }
    }
}
