//! API credentials.

use crate::{Error, Result};
use std::fmt;

/// How the client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// REST API key, sent as `Authorization: Token token=<key>`.
    Token(String),
    /// OAuth access token, sent as `Authorization: Bearer <token>`.
    Bearer(String),
}

impl AuthMethod {
    /// Builds credentials from an auth type name: `token`, or `bearer` /
    /// `oauth2` for OAuth access tokens.
    ///
    /// # Errors
    ///
    /// Returns an error for any other auth type.
    pub fn from_type(auth_type: &str, key: impl Into<String>) -> Result<Self> {
        match auth_type.to_ascii_lowercase().as_str() {
            "token" => Ok(AuthMethod::Token(key.into())),
            "bearer" | "oauth2" => Ok(AuthMethod::Bearer(key.into())),
            other => Err(Error::ConfigurationError(format!(
                "Unsupported auth type \"{other}\"; expected token, bearer or oauth2"
            ))),
        }
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> String {
        match self {
            AuthMethod::Token(key) => format!("Token token={key}"),
            AuthMethod::Bearer(token) => format!("Bearer {token}"),
        }
    }

    /// The key reduced to its last four characters, for display.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdrest::AuthMethod;
    ///
    /// assert_eq!(AuthMethod::Token("y_NbAkKc66ryYTWUXYEu1234".into()).truncated_key(), "*1234");
    /// ```
    pub fn truncated_key(&self) -> String {
        let key = self.key();
        let skip = key.chars().count().saturating_sub(4);
        let last_four: String = key.chars().skip(skip).collect();
        format!("*{last_four}")
    }

    fn key(&self) -> &str {
        match self {
            AuthMethod::Token(key) | AuthMethod::Bearer(key) => key,
        }
    }
}

// never print the full key
impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            AuthMethod::Token(_) => "Token",
            AuthMethod::Bearer(_) => "Bearer",
        };
        f.debug_tuple(kind).field(&self.truncated_key()).finish()
    }
}
