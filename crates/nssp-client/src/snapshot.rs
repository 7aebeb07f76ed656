//! Saving a client to disk and loading it back.
//!
//! # Known weakness
//!
//! A snapshot holds the sealed token *and the key it was sealed with*. The
//! file never contains the plaintext token, but anyone who can read it can
//! decrypt the token. Treat snapshot files like the token itself. Files are
//! created with mode `0600` on Unix.
//!
//! The format is JSON with binary fields in base64:
//!
//! ```json
//! {
//!   "version": 1,
//!   "auth_scheme": "Bearer",
//!   "token": {
//!     "key": "<base64>",
//!     "token": { "version": 1, "nonce": "<base64>", "ciphertext": "<base64>" }
//!   }
//! }
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use nssp_common::AuthScheme;

use crate::client::TokenClient;
use crate::error::ClientError;
use crate::http::HttpTransport;
use crate::Transport;
use crate::sealed::SealedToken;

/// Extension of snapshot files when the caller gives none.
pub const DEFAULT_SNAPSHOT_EXT: &str = ".pkl";

const SNAPSHOT_STEM: &str = "tokenProfile";
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    auth_scheme: &'a AuthScheme,
    token: &'a SealedToken,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    auth_scheme: AuthScheme,
    token: SealedToken,
}

/// Default snapshot file name for `file_ext`, e.g. `tokenProfile.pkl`.
#[must_use]
pub fn default_snapshot_name(file_ext: &str) -> PathBuf {
    PathBuf::from(format!("{SNAPSHOT_STEM}{file_ext}"))
}

fn snapshot_error(context: &str, err: &serde_json::Error) -> ClientError {
    ClientError::Snapshot(format!("{context}: {err}"))
}

impl TokenClient {
    /// Writes the auth scheme and the sealed token, key included, to `path`.
    ///
    /// Without a path the file is `tokenProfile<file_ext>` in the current
    /// directory. An existing file is replaced atomically.
    ///
    /// See the [module docs](crate::snapshot) for why the result must be kept
    /// private.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Snapshot`] if the client cannot be encoded and
    /// [`ClientError::Io`] if the file cannot be written.
    pub fn snapshot(&self, path: Option<&Path>, file_ext: &str) -> Result<PathBuf, ClientError> {
        let path = path.map_or_else(|| default_snapshot_name(file_ext), Path::to_path_buf);

        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            auth_scheme: self.auth_scheme(),
            token: self.sealed_token(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| snapshot_error("Failed to encode snapshot", &e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::Builder::new()
            .prefix(".nssp-snapshot-")
            .tempfile_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(&json)?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| ClientError::Io(e.error))?;

        warn!(
            "Wrote client snapshot to {}; it contains the token key",
            path.display()
        );
        Ok(path)
    }

    /// Loads a client from a snapshot, using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read and
    /// [`ClientError::Snapshot`] if it does not hold a client.
    pub fn restore(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        Self::restore_with_transport(path, HttpTransport::new()?)
    }

    /// Loads a client from a snapshot over the given transport.
    ///
    /// # Errors
    ///
    /// Same as [`TokenClient::restore`].
    pub fn restore_with_transport(
        path: impl AsRef<Path>,
        transport: impl Transport + 'static,
    ) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            snapshot_error(&format!("{} is not a client snapshot", path.display()), &e)
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ClientError::Snapshot(format!(
                "unsupported snapshot version: {}",
                snapshot.version
            )));
        }

        info!("Restored client from {}", path.display());
        Ok(Self::from_parts(
            snapshot.auth_scheme,
            snapshot.token,
            Arc::new(transport),
        ))
    }
}
