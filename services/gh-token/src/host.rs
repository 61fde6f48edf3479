//! Canonical API hosts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The public GitHub API host.
pub const DEFAULT_HOST: &str = "api.github.com";

const ENTERPRISE_API_PATH: &str = "/api/v3";

/// A canonical API host: a hostname, optionally followed by a path.
///
/// Build one with [`Host::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Host(String);

impl Host {
    /// Normalize a user supplied host.
    ///
    /// The host is lowercased. `api.github.com` is returned as is; any other
    /// host is treated as a GitHub Enterprise Server and gets `/api/v3`
    /// appended unless it already contains it.
    ///
    /// Trailing slashes are not stripped, so `ghe.example.com/` becomes
    /// `ghe.example.com//api/v3`.
    ///
    /// ```rust
    /// use gh_token::Host;
    ///
    /// assert_eq!(Host::resolve("API.GitHub.com").as_str(), "api.github.com");
    /// assert_eq!(Host::resolve("GHE.example.com").as_str(), "ghe.example.com/api/v3");
    /// ```
    pub fn resolve(hostname: &str) -> Self {
        let hostname = hostname.to_lowercase();
        if hostname == DEFAULT_HOST || hostname.contains(ENTERPRISE_API_PATH) {
            Host(hostname)
        } else {
            Host(format!("{hostname}{ENTERPRISE_API_PATH}"))
        }
    }

    /// The canonical host string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL for API requests against this host.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl Default for Host {
    fn default() -> Self {
        Host(DEFAULT_HOST.to_owned())
    }
}

impl From<String> for Host {
    fn from(value: String) -> Self {
        Host::resolve(&value)
    }
}

impl From<Host> for String {
    fn from(value: Host) -> Self {
        value.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
