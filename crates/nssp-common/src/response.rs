use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status;

/// A response as returned by the transport.
///
/// Header names are stored lower-cased. The body is kept as raw bytes; the
/// client decides how to decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// The URL that was requested.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lower-cased name.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// When the response was received.
    pub received_at: DateTime<Utc>,
}

impl ApiResponse {
    /// Creates a response stamped with the current time and no headers.
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: HashMap::new(),
            body: body.into(),
            received_at: Utc::now(),
        }
    }

    /// Adds a header, lower-casing its name.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The reason phrase for this response's status, or `unknown`.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        status::describe(self.status)
    }

    /// Whether the status is the one the API uses for a usable body (200).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == 200
    }

    /// The body as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A binary response body written to a temporary file.
///
/// The file outlives the call that created it and is never removed by the
/// client. Delete it with [`GraphHandle::remove`] or manage `path` directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphHandle {
    /// Location of the file holding the response body.
    pub path: PathBuf,
    /// The response the file was written from.
    pub response: ApiResponse,
}

impl GraphHandle {
    /// Pairs a written file with the response it came from.
    #[must_use]
    pub const fn new(path: PathBuf, response: ApiResponse) -> Self {
        Self { path, response }
    }

    /// Path of the written file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be removed.
    pub fn remove(self) -> std::io::Result<ApiResponse> {
        std::fs::remove_file(&self.path)?;
        Ok(self.response)
    }
}
