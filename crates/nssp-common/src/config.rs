use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::auth::AuthScheme;

/// Configuration for a token client and its default transport.
///
/// The token itself is deliberately absent: it is handed to the client
/// separately and sealed on arrival.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use nssp_common::{AuthScheme, Config};
///
/// let config = Config::default()
///     .with_auth_scheme("Basic")
///     .with_timeout_seconds(60)
///     .with_graph_dir("/tmp/graphs");
///
/// assert_eq!(config.auth_scheme, AuthScheme::Basic);
/// assert_eq!(config.graph_dir, Some(PathBuf::from("/tmp/graphs")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct Config {
    /// Scheme placed before the token in the `Authorization` header.
    #[serde(default)]
    #[builder(default)]
    pub auth_scheme: AuthScheme,
    /// Request timeout in seconds, applied by the HTTP transport.
    ///
    /// `None` leaves requests without a timeout.
    #[serde(default)]
    #[builder(default)]
    pub timeout_seconds: Option<u64>,
    /// Overrides the transport's `User-Agent` header.
    #[serde(default)]
    #[builder(default)]
    pub user_agent: Option<String>,
    /// Directory for graph downloads; the system temp directory when unset.
    #[serde(default)]
    #[builder(default)]
    pub graph_dir: Option<PathBuf>,
}

impl Config {
    /// Sets the authorization scheme.
    #[must_use]
    pub fn with_auth_scheme(mut self, scheme: impl Into<AuthScheme>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub const fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Sets the transport's user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the directory graph files are written to.
    #[must_use]
    pub fn with_graph_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.graph_dir = Some(dir.into());
        self
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
