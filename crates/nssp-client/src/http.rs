//! `reqwest`-backed transport.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use nssp_common::{ApiResponse, Config};

use crate::Transport;
use crate::error::ClientError;

/// User agent sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = concat!("nssp-client/", env!("CARGO_PKG_VERSION"));

/// Transport issuing plain GET requests with `reqwest`.
///
/// No retries, no middleware. A timeout is applied only when the
/// configuration sets one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend
    /// initialization fails).
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(&Config::default())
    }

    /// Creates a transport honoring the timeout and user agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        // None means no timeout
        let builder = match config.timeout() {
            Some(timeout) => reqwest::Client::builder().timeout(timeout),
            None => reqwest::Client::builder(),
        };

        Ok(Self {
            client: builder.user_agent(user_agent).build()?,
        })
    }

    /// Wraps an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, authorization: &SecretString) -> Result<ApiResponse, ClientError> {
        let mut auth_value =
            HeaderValue::from_str(authorization.expose_secret()).map_err(ClientError::transport)?;
        auth_value.set_sensitive(true);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth_value)
            .send()
            .await?;

        let status = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                debug!("Skipping non-ASCII value of header {name}");
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.bytes().await?.to_vec();
        debug!("Received {} bytes from {url}", body.len());

        Ok(ApiResponse {
            url: url.to_string(),
            status,
            headers,
            body,
            received_at: Utc::now(),
        })
    }
}
