// ── Core error types ──
//
// Errors raised inside a refresh cycle. None of these reach the
// presentation layer verbatim: the controller logs them and publishes
// `LoadStatus::Error` with the generic message instead. The
// `From<fetchlist_api::Error>` impl sorts transport failures into the
// network / decode / configuration buckets.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// HTTP status code (if the server answered at all).
        status: Option<u16>,
    },

    #[error("Payload did not match the item schema: {message}")]
    Decode { message: String },

    // ── Processing errors ────────────────────────────────────────────
    #[error("Item pipeline failed: {message}")]
    Pipeline { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Short machine-friendly tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Decode { .. } => "decode",
            Self::Pipeline { .. } => "pipeline",
            Self::Config { .. } => "config",
            Self::Internal(_) => "internal",
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fetchlist_api::Error> for CoreError {
    fn from(err: fetchlist_api::Error) -> Self {
        match err {
            fetchlist_api::Error::Transport(ref e) => CoreError::Network {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            fetchlist_api::Error::Status { status, url } => CoreError::Network {
                message: format!("HTTP {status} from {url}"),
                status: Some(status),
            },
            fetchlist_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            fetchlist_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fetchlist_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
        }
    }
}
