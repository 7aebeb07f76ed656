use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The prefix placed before the credential in the `Authorization` header.
///
/// `Bearer` and `Basic` are the schemes the NSSP API documents. Any other
/// value is carried verbatim in [`AuthScheme::Custom`]; schemes are never
/// validated or rejected.
///
/// # Examples
///
/// ```
/// use nssp_common::AuthScheme;
///
/// assert_eq!(AuthScheme::default(), AuthScheme::Bearer);
/// assert_eq!(AuthScheme::from("Token").header_value("abc"), "Token abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: Basic <token>`
    Basic,
    /// Any other prefix, passed through as given.
    Custom(String),
}

impl AuthScheme {
    /// Returns the header prefix for this scheme.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bearer => "Bearer",
            Self::Basic => "Basic",
            Self::Custom(scheme) => scheme,
        }
    }

    /// Formats a full `Authorization` header value for `credential`.
    ///
    /// The result contains the credential in plaintext; callers are expected
    /// to wrap it in a secret container immediately.
    #[must_use]
    pub fn header_value(&self, credential: &str) -> String {
        let scheme = self.as_str();
        // Exact capacity, so `into_boxed_str` does not reallocate.
        let mut value = String::with_capacity(scheme.len() + 1 + credential.len());
        value.push_str(scheme);
        value.push(' ');
        value.push_str(credential);
        value
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AuthScheme {
    fn from(s: &str) -> Self {
        match s {
            "Bearer" => Self::Bearer,
            "Basic" => Self::Basic,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for AuthScheme {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Bearer" => Self::Bearer,
            "Basic" => Self::Basic,
            _ => Self::Custom(s),
        }
    }
}

impl From<AuthScheme> for String {
    fn from(scheme: AuthScheme) -> Self {
        match scheme {
            AuthScheme::Custom(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for AuthScheme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_known_schemes() {
        assert_eq!(AuthScheme::from("Bearer"), AuthScheme::Bearer);
        assert_eq!(AuthScheme::from("Basic"), AuthScheme::Basic);
        assert_eq!(AuthScheme::Bearer.to_string(), "Bearer");
        assert_eq!(AuthScheme::Basic.to_string(), "Basic");
    }

    #[test]
    fn test_unknown_scheme_passes_through() {
        let scheme: AuthScheme = "bearer".parse().unwrap();
        assert_eq!(scheme, AuthScheme::Custom("bearer".to_string()));
        assert_eq!(scheme.as_str(), "bearer");

        let empty = AuthScheme::from("");
        assert_eq!(empty.header_value("abc"), " abc");
    }

    #[test]
    fn test_header_value() {
        assert_eq!(AuthScheme::Bearer.header_value("abc123"), "Bearer abc123");
        assert_eq!(AuthScheme::Basic.header_value("dXNlcjpwdw=="), "Basic dXNlcjpwdw==");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&AuthScheme::Basic).unwrap();
        assert_eq!(json, "\"Basic\"");

        let custom: AuthScheme = serde_json::from_str("\"ApiKey\"").unwrap();
        assert_eq!(custom, AuthScheme::Custom("ApiKey".to_string()));

        let bearer: AuthScheme = serde_json::from_str("\"Bearer\"").unwrap();
        assert_eq!(bearer, AuthScheme::Bearer);
    }
}
