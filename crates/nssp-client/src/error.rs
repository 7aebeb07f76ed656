//! Error types for the client library.

use thiserror::Error;

/// Boxed error produced by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when calling the API through a [`TokenClient`].
///
/// A non-200 response is not an error by itself: `fetch_raw` reports it and
/// returns `None`. [`ClientError::NoData`] is raised only when a caller goes
/// on to consume that absent body.
///
/// [`TokenClient`]: crate::TokenClient
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The cipher could not be initialized or the token could not be sealed.
    ///
    /// Only raised while constructing a client; treat as fatal.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// The sealed token could not be opened.
    ///
    /// Key and ciphertext are created together and never modified, so this
    /// indicates a corrupted snapshot or a broken invariant rather than a
    /// condition worth recovering from.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Network-level failure from the transport.
    ///
    /// DNS resolution, refused connections, timeouts and similar. Never
    /// retried by the client.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The request URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A response body was requested but the API did not answer with 200.
    #[error("No data: {url} returned status {status}")]
    NoData {
        /// The requested URL.
        url: String,
        /// The status the API answered with.
        status: u16,
    },

    /// The body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is not valid delimited text.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The body could not be decoded with the requested text encoding.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The requested text encoding label is not recognized.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Filesystem failure while writing a graph file or a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot file exists but does not hold a client.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl ClientError {
    /// Wraps any transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Check if this error came from decoding a response body.
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::Csv(_) | Self::Decode(_) | Self::UnknownEncoding(_)
        )
    }

    /// Check if this error is the absent-response failure.
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }

    /// Check if this error came from the network layer.
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::InvalidUrl { .. })
    }

    /// The HTTP status behind a [`ClientError::NoData`].
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NoData { status, .. } => Some(*status),
            _ => None,
        }
    }
}
