//! GitHub API object models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::InstallationToken;

/// Github API response for a single installation.
///
/// Fields without a dedicated member are kept in `extra`, so an installation
/// re-serializes with everything the API sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    /// Installation ID.
    pub id: u64,

    /// Account associated with the installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,

    /// Remaining fields of the installation record.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Account associated with an installation.
///
/// User and organization accounts have a `login`; enterprise accounts have a
/// `slug` and `name` instead, which end up in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    /// Account ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// Remaining fields of the account record.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// API credentials for access to a Github installation.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationAccess {
    /// Installation access token
    pub token: InstallationToken,

    /// Token expiration time.
    pub expires_at: DateTime<Utc>,

    /// Permissions granted to the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, String>>,

    /// Whether the token covers `all` or `selected` repositories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_selection: Option<String>,

    /// Remaining fields of the response, e.g. `repositories`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InstallationAccess {
    /// Check if the access token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Body of a `201 Created` from the token exchange, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    #[serde(default)]
    pub(crate) token: Option<InstallationToken>,
    pub(crate) expires_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) permissions: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub(crate) repository_selection: Option<String>,
    #[serde(flatten)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl AccessTokenResponse {
    /// Promote to [`InstallationAccess`], unless the token is missing or empty.
    pub(crate) fn into_access(self) -> Option<InstallationAccess> {
        let token = self.token.filter(|token| !token.is_empty())?;
        Some(InstallationAccess {
            token,
            expires_at: self.expires_at,
            permissions: self.permissions,
            repository_selection: self.repository_selection,
            extra: self.extra,
        })
    }
}
