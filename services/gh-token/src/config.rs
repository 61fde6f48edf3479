use camino::Utf8PathBuf;
use secret::Secret;
use serde::Deserialize;

use crate::auth::InstallationToken;
use crate::error::ConfigError;
use crate::host::{Host, DEFAULT_HOST};
use crate::key::KeySource;

fn default_hostname() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_jwt_expiry() -> i64 {
    1
}

/// Identity of a Github App and where to find its signing key.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// App ID from Github
    pub app_id: String,

    /// Path to the PEM private key.
    #[serde(default)]
    pub key_file: Option<Utf8PathBuf>,

    /// Base64 encoded PEM private key.
    #[serde(default)]
    pub key_base64: Option<Secret>,

    /// API host, e.g. `api.github.com` or a GitHub Enterprise Server hostname.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

impl AppConfig {
    /// A configuration for `app_id` on the public GitHub API, with no key source yet.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            key_file: None,
            key_base64: None,
            hostname: default_hostname(),
        }
    }

    /// Use the PEM key at `path`.
    pub fn with_key_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    /// Use a base64 encoded PEM key.
    pub fn with_key_base64(mut self, encoded: impl Into<Secret>) -> Self {
        self.key_base64 = Some(encoded.into());
        self
    }

    /// Talk to `hostname` instead of the public GitHub API.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// The key source, checking that exactly one was configured.
    pub fn key_source(&self) -> Result<KeySource, ConfigError> {
        KeySource::from_options(self.key_file.clone(), self.key_base64.clone())
    }

    /// The canonical API host.
    pub fn host(&self) -> Host {
        Host::resolve(&self.hostname)
    }
}

/// Inputs for generating an installation token (or just the App JWT).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    /// The App and its key.
    #[serde(flatten)]
    pub app: AppConfig,

    /// Installation to issue a token for. The App's first installation when unset.
    #[serde(default)]
    pub installation_id: Option<u64>,

    /// JWT lifetime in minutes, clamped to `1..=10`.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_minutes: i64,

    /// Stop after signing and return the JWT itself.
    #[serde(default)]
    pub jwt_only: bool,
}

impl GenerateConfig {
    /// Generate a token for `app` with the default settings.
    pub fn new(app: AppConfig) -> Self {
        Self {
            app,
            installation_id: None,
            jwt_expiry_minutes: default_jwt_expiry(),
            jwt_only: false,
        }
    }
}

/// Inputs for revoking an installation token.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeConfig {
    /// The token to revoke. It also authenticates the request.
    pub token: InstallationToken,

    /// API host, e.g. `api.github.com` or a GitHub Enterprise Server hostname.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

impl RevokeConfig {
    /// Revoke `token` on the public GitHub API.
    pub fn new(token: InstallationToken) -> Self {
        Self {
            token,
            hostname: default_hostname(),
        }
    }

    /// The canonical API host.
    pub fn host(&self) -> Host {
        Host::resolve(&self.hostname)
    }
}
