//! Token-authorized API client.
//!
//! # Response handling
//!
//! Every request reports `"<status>: <reason>"` at info level. What happens
//! next depends on how the body is consumed:
//!
//! - [`TokenClient::fetch_raw`] returns `Ok(None)` for any status other than
//!   200. This is not an error; callers can branch on it.
//! - [`TokenClient::fetch_data`], [`TokenClient::fetch_json`],
//!   [`TokenClient::fetch_table`] and [`TokenClient::fetch_graph`] need a
//!   body, so a non-200 status becomes [`ClientError::NoData`].
//!
//! Network failures always propagate as [`ClientError::Transport`]. Nothing
//! is retried.
//!
//! # Security
//!
//! The token is held sealed under a per-client key. It is decrypted once per
//! request, straight into a `SecretString` header value that is dropped as
//! soon as the transport returns.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error, info, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use zeroize::Zeroizing;

use nssp_common::{ApiResponse, AuthScheme, Config, GraphHandle, Table, TabularOptions, status};

use crate::Transport;
use crate::decode::{self, ApiData, CsvDecoder, DataFormat, TabularDecoder};
use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::sealed::SealedToken;

/// File extension used by [`TokenClient::fetch_graph`] callers that have no
/// better idea.
pub const DEFAULT_GRAPH_EXT: &str = ".png";

const GRAPH_FILE_PREFIX: &str = "nssp-graph-";

/// Client that authorizes every request with a sealed token.
///
/// Cloning is cheap and clones share the sealed token. The scheme is the only
/// mutable state and is per clone.
///
/// # Examples
///
/// ```no_run
/// use nssp_client::{AuthScheme, TokenClient};
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut client = TokenClient::new("abc123")?;
/// client.set_auth_scheme(AuthScheme::Basic);
///
/// let json: serde_json::Value = client.fetch_json("https://api.test/x").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenClient {
    auth_scheme: AuthScheme,
    token: Arc<SealedToken>,
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn TabularDecoder>,
    graph_dir: Option<PathBuf>,
}

// Custom Debug implementation to avoid exposing the token
impl fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenClient")
            .field("auth_scheme", &self.auth_scheme)
            .field("token", &"[REDACTED]")
            .field("graph_dir", &self.graph_dir)
            .finish_non_exhaustive()
    }
}

impl TokenClient {
    /// Creates a `Bearer` client over the default HTTP transport.
    ///
    /// The token is sealed immediately and the passed-in buffer is wiped.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encryption`] if the token cannot be sealed, or
    /// a transport error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = Zeroizing::new(token.into());
        Self::from_config(&SecretString::new(token.as_str().into()), &Config::default())
    }

    /// Creates a client from a secret token and a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encryption`] if the token cannot be sealed, or
    /// a transport error if the HTTP client cannot be built.
    pub fn from_config(token: &SecretString, config: &Config) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(config)?;
        let sealed = SealedToken::seal(token.expose_secret())?;

        let mut client = Self::from_parts(config.auth_scheme.clone(), sealed, Arc::new(transport));
        client.graph_dir.clone_from(&config.graph_dir);
        Ok(client)
    }

    /// Creates a `Basic` client whose token is `base64(username:password)`.
    ///
    /// # Errors
    ///
    /// Same as [`TokenClient::new`].
    pub fn basic(username: &str, password: &str) -> Result<Self, ClientError> {
        let pair = Zeroizing::new(format!("{username}:{password}"));
        let encoded = Zeroizing::new(BASE64.encode(pair.as_bytes()));

        let mut client = Self::new(encoded.as_str())?;
        client.set_auth_scheme(AuthScheme::Basic);
        Ok(client)
    }

    pub(crate) fn from_parts(
        auth_scheme: AuthScheme,
        token: SealedToken,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            auth_scheme,
            token: Arc::new(token),
            transport,
            decoder: Arc::new(CsvDecoder),
            graph_dir: None,
        }
    }

    /// Replaces the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replaces the transport with one shared with other clients.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replaces the tabular decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl TabularDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Sets the authorization scheme.
    #[must_use]
    pub fn with_auth_scheme(mut self, scheme: impl Into<AuthScheme>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    /// Sets the directory graph files are created in.
    #[must_use]
    pub fn with_graph_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.graph_dir = Some(dir.into());
        self
    }

    /// The scheme placed before the token in the `Authorization` header.
    #[must_use]
    pub const fn auth_scheme(&self) -> &AuthScheme {
        &self.auth_scheme
    }

    /// Changes the authorization scheme. Any value is accepted.
    pub fn set_auth_scheme(&mut self, scheme: impl Into<AuthScheme>) {
        self.auth_scheme = scheme.into();
    }

    /// Directory graph files are created in, if not the system temp dir.
    #[must_use]
    pub fn graph_dir(&self) -> Option<&Path> {
        self.graph_dir.as_deref()
    }

    pub(crate) fn sealed_token(&self) -> &SealedToken {
        &self.token
    }

    /// Builds the `Authorization` header value from the sealed token.
    fn authorization(&self) -> Result<SecretString, ClientError> {
        self.token.with_exposed(|token| {
            SecretString::new(self.auth_scheme.header_value(token).into_boxed_str())
        })
    }

    /// Sends the request and reports its status, whatever it is.
    async fn request(&self, url: &str) -> Result<ApiResponse, ClientError> {
        url::Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!("GET {url} ({} authorization)", self.auth_scheme);

        let response = {
            let authorization = self.authorization()?;
            self.transport
                .get(url, &authorization)
                .await
                .inspect_err(|e| error!("Request to {url} failed: {e}"))?
        };

        info!("{}: {}", response.status, status::describe(response.status));
        Ok(response)
    }

    /// Sends the request and insists on a 200 response.
    async fn request_body(&self, url: &str) -> Result<ApiResponse, ClientError> {
        let response = self.request(url).await?;
        if response.is_success() {
            Ok(response)
        } else {
            warn!("No data from {url}: status {}", response.status);
            Err(ClientError::NoData {
                url: url.to_string(),
                status: response.status,
            })
        }
    }

    /// Fetches `url` and returns the response if, and only if, the status is
    /// 200.
    ///
    /// The status and its reason phrase are logged at info level for every
    /// response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `url` cannot be parsed,
    /// [`ClientError::Transport`] for network failures, and
    /// [`ClientError::Decryption`] if the sealed token cannot be opened.
    pub async fn fetch_raw(&self, url: &str) -> Result<Option<ApiResponse>, ClientError> {
        let response = self.request(url).await?;
        Ok(response.is_success().then_some(response))
    }

    /// Fetches `url` and decodes the body as described by `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoData`] when the status is not 200, a parse
    /// error when the body does not decode, and the errors of
    /// [`TokenClient::fetch_raw`].
    pub async fn fetch_data(&self, url: &str, format: &DataFormat) -> Result<ApiData, ClientError> {
        let response = self.request_body(url).await?;
        match format {
            DataFormat::Json => Ok(ApiData::Json(decode::decode_json(&response.body)?)),
            DataFormat::Tabular { encoding, options } => {
                let text = decode::decode_text(&response.body, encoding)?;
                Ok(ApiData::Table(self.decoder.decode(&text, options)?))
            }
        }
    }

    /// Fetches `url` and deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`TokenClient::fetch_data`].
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.request_body(url).await?;
        decode::decode_json(&response.body)
    }

    /// Fetches `url` and parses the body as delimited text.
    ///
    /// `options` reach the tabular decoder unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`TokenClient::fetch_data`].
    pub async fn fetch_table(
        &self,
        url: &str,
        encoding: &str,
        options: &TabularOptions,
    ) -> Result<Table, ClientError> {
        let response = self.request_body(url).await?;
        let text = decode::decode_text(&response.body, encoding)?;
        self.decoder.decode(&text, options)
    }

    /// Fetches `url` and writes the body to a new temporary file whose name
    /// ends in `file_ext`.
    ///
    /// The file is closed before this returns and is left on disk; removing
    /// it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoData`] when the status is not 200, in which
    /// case no file is created; [`ClientError::Io`] if the file cannot be
    /// written; and the errors of [`TokenClient::fetch_raw`].
    pub async fn fetch_graph(&self, url: &str, file_ext: &str) -> Result<GraphHandle, ClientError> {
        let response = self.request_body(url).await?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(GRAPH_FILE_PREFIX).suffix(file_ext);
        let mut file = match &self.graph_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(&response.body)?;
        file.flush()?;
        let (file, path) = file.keep().map_err(|e| ClientError::Io(e.error))?;
        drop(file);

        debug!(
            "Wrote {} bytes from {url} to {}",
            response.body.len(),
            path.display()
        );
        Ok(GraphHandle::new(path, response))
    }
}
