//! TOML profile for the CLI.
//!
//! Read from `~/.config/nssp/config.toml` unless `--config` names another
//! file. Every field is optional:
//!
//! ```toml
//! auth_scheme = "Bearer"
//! timeout_seconds = 30
//! token_env = "NSSP_TOKEN"
//! graph_dir = "/tmp/nssp"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use nssp_client::Config;

/// Environment variable holding the token when the profile names none.
pub const DEFAULT_TOKEN_ENV: &str = "NSSP_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Client settings, at the top level of the file.
    #[serde(flatten)]
    pub client: Config,

    /// Name of the environment variable the token is read from.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Profile {
    /// Loads the profile.
    ///
    /// An explicit `path` must exist. The default location may be missing,
    /// in which case defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No profile found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// `~/.config/nssp/config.toml`, if a config directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nssp").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile = toml::from_str(&contents)
            .with_context(|| format!("Invalid profile {}", path.display()))?;
        debug!("Loaded profile from {}", path.display());
        Ok(profile)
    }

    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Picks the token from the flag, falling back to the profile's
    /// environment variable as seen through `lookup`.
    pub fn resolve_token(
        &self,
        flag: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SecretString> {
        let env = self.token_env();
        let token = flag
            .or_else(|| lookup(env))
            .filter(|token| !token.is_empty())
            .with_context(|| format!("A token must be provided via --token or {env}"))?;
        Ok(SecretString::new(token.into()))
    }
}
