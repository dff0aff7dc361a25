/// Errors from the remote spreadsheet layer.
use thiserror::Error;

/// Typed errors from the Sheets backend and its authentication.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The credential file could not be read or does not have the expected shape.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The token endpoint rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The API refused the request (HTTP 401/403).
    #[error("Not authorized to access spreadsheet: {message}")]
    Unauthorized {
        /// Message from the Google error envelope.
        message: String,
    },

    /// No spreadsheet with this id is visible to the credentials.
    #[error("No spreadsheet with id '{spreadsheet_id}'")]
    SpreadsheetNotFound {
        /// The requested spreadsheet id.
        spreadsheet_id: String,
    },

    /// The spreadsheet exists but has no tab with this title.
    #[error("Spreadsheet '{spreadsheet_id}' has no worksheet named '{title}'")]
    WorksheetNotFound {
        /// The spreadsheet that was searched.
        spreadsheet_id: String,
        /// The requested worksheet title.
        title: String,
    },

    /// Quota exhausted (HTTP 429).
    #[error("Rate limited by the Sheets API{}", retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited {
        /// Value of the `Retry-After` header, in seconds, when present.
        retry_after: Option<u64>,
    },

    /// Any other non-success HTTP status.
    #[error("Sheets API returned HTTP {code}: {message}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Message from the Google error envelope, or the raw body.
        message: String,
    },

    /// Connection, TLS or DNS failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response body did not decode as expected.
    #[error("Unexpected response from {context}: {detail}")]
    Decode {
        /// Which call produced the response.
        context: String,
        /// Decoder message.
        detail: String,
    },
}

impl SheetsError {
    /// Whether this error means the credentials are unusable.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Credentials(_) | Self::AuthFailed(_) | Self::Unauthorized { .. }
        )
    }
}
