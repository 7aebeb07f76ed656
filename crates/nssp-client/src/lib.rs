//! # nssp-client
//!
//! Client library for calling the NSSP API with a token that never sits in
//! memory as plaintext.
//!
//! The token handed to a [`TokenClient`] is encrypted on arrival under a key
//! generated for that client alone. It is decrypted only while the
//! `Authorization` header of an outgoing request is being built. Responses
//! can be consumed three ways:
//! - [`TokenClient::fetch_raw`]: the response itself, or `None` for any status
//!   other than 200
//! - [`TokenClient::fetch_data`]: the body decoded as JSON or as a table
//! - [`TokenClient::fetch_graph`]: the body written to a temporary file
//!
//! ## Example
//!
//! ```no_run
//! use nssp_client::{DataFormat, TokenClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = TokenClient::new("abc123")?;
//!
//! // A non-200 status is reported and yields None
//! if let Some(response) = client.fetch_raw("https://api.test/essence/status").await? {
//!     println!("{} bytes", response.body.len());
//! }
//!
//! // Consuming the body of a non-200 response is an error
//! let data = client
//!     .fetch_data("https://api.test/essence/table.csv", &DataFormat::tabular())
//!     .await?;
//! println!("{:?}", data.as_table().map(|t| t.len()));
//!
//! let graph = client.fetch_graph("https://api.test/essence/chart", ".png").await?;
//! println!("saved to {}", graph.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Token handling
//!
//! The sealed token and its key are private to this crate. The only way to
//! write them out is [`TokenClient::snapshot`]:
//!
//! ```compile_fail
//! use nssp_client::SealedToken;
//! ```
//!
//! ```compile_fail
//! let sealed = nssp_client::sealed::SealedToken::seal("abc123");
//! ```

use async_trait::async_trait;
use secrecy::SecretString;

pub mod client;
pub mod decode;
pub mod error;
pub mod http;
mod sealed;
pub mod snapshot;

pub use client::{DEFAULT_GRAPH_EXT, TokenClient};
pub use decode::{ApiData, CsvDecoder, DEFAULT_ENCODING, DataFormat, TabularDecoder};
pub use error::ClientError;
pub use http::HttpTransport;
pub use snapshot::DEFAULT_SNAPSHOT_EXT;

pub use nssp_common::{
    ApiResponse, AuthScheme, Config, GraphHandle, Table, TabularOptions, status,
};

/// Issues authorized GET requests.
///
/// The client depends on nothing else about the network layer. Implementations
/// must be thread-safe (Send + Sync) and must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET of `url` with the given `Authorization` header value.
    ///
    /// Any status the server answers with, 200 or not, is a successful
    /// transport result.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] for network-level failures such as
    /// DNS errors, refused connections or timeouts.
    async fn get(&self, url: &str, authorization: &SecretString) -> Result<ApiResponse, ClientError>;
}
