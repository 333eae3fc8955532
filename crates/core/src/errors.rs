use thiserror::Error;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network (transient) ─────────────────────────────────────────
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    // ── Remote API (non-retryable) ──────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ── Local cache ─────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid cache file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported cache schema version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    /// Neither a live fetch nor the cache could supply holdings.
    #[error("{0}")]
    NoDataAvailable(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The calling scope was cancelled. Never retried, never turned into a fallback.
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Timeouts and connection failures. The fetch gateway retries these.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Timeout(_) | CoreError::Network(_))
    }

    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest messages embed the full URL; keep the query string out of logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };

        if e.is_timeout() {
            CoreError::Timeout(sanitized)
        } else if let Some(status) = e.status() {
            CoreError::Api {
                provider: "HoldingsApi".into(),
                message: format!("HTTP {status}: {sanitized}"),
            }
        } else if e.is_decode() {
            CoreError::InvalidResponse(sanitized)
        } else if e.is_builder() {
            CoreError::ValidationError(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
