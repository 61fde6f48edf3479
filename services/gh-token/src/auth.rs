//! Credential types for the two authentication contexts of a GitHub App.
//!
//! App-level endpoints take an [`AppJwt`]; installation-level endpoints take an
//! [`InstallationToken`]. Keeping them apart means a revoke call cannot be
//! handed a JWT, and a token exchange cannot be handed an installation token.

use std::fmt;

use api_client::{bearer_auth, Authentication, Secret};
use http::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};

/// A signed, short-lived JWT asserting the identity of the App.
///
/// Created by [`AppJwt::sign`](crate::AppJwt::sign).
#[derive(Debug, Clone)]
pub struct AppJwt(Secret);

impl AppJwt {
    pub(crate) fn new(token: Secret) -> Self {
        AppJwt(token)
    }

    /// The compact serialized JWT.
    pub fn revealed(&self) -> &str {
        self.0.revealed()
    }
}

impl Authentication for AppJwt {
    fn authenticate<B>(&self, req: http::Request<B>) -> Result<http::Request<B>, InvalidHeaderValue> {
        bearer_auth(&self.0, req)
    }
}

/// An installation access token, as issued by the token exchange.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallationToken(Secret);

impl InstallationToken {
    /// Wrap a previously issued token.
    pub fn new(token: impl Into<Secret>) -> Self {
        InstallationToken(token.into())
    }

    /// The token value.
    pub fn revealed(&self) -> &str {
        self.0.revealed()
    }

    /// True for an empty token string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InstallationToken").field(&self.0).finish()
    }
}

impl std::str::FromStr for InstallationToken {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(InstallationToken(s.parse()?))
    }
}

impl Authentication for InstallationToken {
    fn authenticate<B>(&self, req: http::Request<B>) -> Result<http::Request<B>, InvalidHeaderValue> {
        bearer_auth(&self.0, req)
    }
}
