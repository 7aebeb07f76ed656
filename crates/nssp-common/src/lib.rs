//! # nssp-common
//!
//! Common types shared by the NSSP API client and its command line front end.
//!
//! This crate holds the plain data side of authorized API access:
//! - Authorization schemes used to build the `Authorization` header
//! - Transport responses and the handles returned for binary downloads
//! - Tabular data decoded from delimited response bodies
//! - Client configuration
//! - The static HTTP status reason table used for diagnostics
//!
//! ## Example
//!
//! ```
//! use nssp_common::{AuthScheme, Config, status};
//!
//! let config = Config::builder()
//!     .auth_scheme(AuthScheme::Basic)
//!     .timeout_seconds(Some(30))
//!     .build();
//!
//! assert_eq!(config.auth_scheme.as_str(), "Basic");
//! assert_eq!(status::describe(404), "Not Found");
//! ```

/// Authorization header schemes.
pub mod auth;
/// Client configuration.
pub mod config;
/// Transport responses and download handles.
pub mod response;
/// HTTP status reason phrases for diagnostic output.
pub mod status;
/// Tabular data decoded from delimited text.
pub mod table;

pub use auth::AuthScheme;
pub use config::Config;
pub use response::{ApiResponse, GraphHandle};
pub use table::{Table, TabularOptions};
