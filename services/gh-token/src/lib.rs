//! # GitHub App installation tokens
//!
//! Sign an App JWT with the App's RSA key, exchange it for an installation
//! access token, list the App's installations, and revoke tokens once they
//! are no longer needed. Works against `api.github.com` and GitHub
//! Enterprise Server hosts.
//!
//! ```no_run
//! # async fn run() -> Result<(), gh_token::Error> {
//! use gh_token::{AppConfig, GenerateConfig, Generated};
//!
//! let app = AppConfig::new("123456").with_key_file("app-key.pem");
//! let mut config = GenerateConfig::new(app);
//! config.installation_id = Some(12345);
//!
//! if let Generated::Installation(access) = gh_token::generate_token(&config).await? {
//!     println!("{}", access.token.revealed());
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod host;
mod installations;
mod jwt;
mod key;
mod models;
mod revoke;
mod token;

pub use self::auth::{AppJwt, InstallationToken};
pub use self::client::GithubClient;
pub use self::config::{AppConfig, GenerateConfig, RevokeConfig};
pub use self::error::{
    ConfigError, Error, ErrorKind, KeyError, Operation, RequestError, SigningError,
};
pub use self::host::{Host, DEFAULT_HOST};
pub use self::installations::{PAGE_DELAY, PAGE_SIZE};
pub use self::jwt::{clamp_expiry_minutes, CLOCK_DRIFT_OFFSET_SECONDS, MAX_EXPIRY_MINUTES};
pub use self::key::{KeyOrigin, KeySource};
pub use self::models::{Account, Installation, InstallationAccess};
pub use secret::Secret;

/// JWT lifetime used when signing only to list installations.
const LISTING_JWT_EXPIRY_MINUTES: i64 = 1;

/// The credential produced by [`generate_token`].
#[derive(Debug, Clone)]
pub enum Generated {
    /// The App JWT, when only the JWT was requested.
    Jwt(AppJwt),
    /// An installation access token and its metadata.
    Installation(InstallationAccess),
}

impl GithubClient {
    /// Sign an App JWT and, unless only the JWT is wanted, exchange it for
    /// an installation token.
    ///
    /// Without an installation ID the App's first installation is used.
    #[tracing::instrument(skip_all, fields(app = %config.app.app_id))]
    pub async fn generate_token(&self, config: &GenerateConfig) -> Result<Generated, Error> {
        let host = config.app.host();
        let jwt = sign_app_jwt(&config.app, config.jwt_expiry_minutes)?;

        if config.jwt_only {
            return Ok(Generated::Jwt(jwt));
        }

        let installation_id = match config.installation_id {
            Some(id) => id,
            None => self.default_installation(&host, &jwt).await?.id,
        };

        let access = self
            .create_installation_token(&host, &jwt, installation_id)
            .await?;
        Ok(Generated::Installation(access))
    }

    /// List every installation of the App.
    #[tracing::instrument(skip_all, fields(app = %config.app_id))]
    pub async fn list_installations(&self, config: &AppConfig) -> Result<Vec<Installation>, Error> {
        let jwt = sign_app_jwt(config, LISTING_JWT_EXPIRY_MINUTES)?;
        Ok(self.installations(&config.host(), &jwt).await?)
    }

    /// Revoke an installation token.
    #[tracing::instrument(skip_all)]
    pub async fn revoke_token(&self, config: &RevokeConfig) -> Result<(), Error> {
        Ok(self
            .revoke_installation_token(&config.host(), &config.token)
            .await?)
    }
}

fn sign_app_jwt(config: &AppConfig, expiry_minutes: i64) -> Result<AppJwt, Error> {
    let key = config.key_source()?.load()?;
    Ok(AppJwt::sign(&config.app_id, expiry_minutes, key)?)
}

/// Generate an App JWT or an installation token, see [`GithubClient::generate_token`].
pub async fn generate_token(config: &GenerateConfig) -> Result<Generated, Error> {
    GithubClient::new().generate_token(config).await
}

/// List every installation of the App, see [`GithubClient::list_installations`].
pub async fn list_installations(config: &AppConfig) -> Result<Vec<Installation>, Error> {
    GithubClient::new().list_installations(config).await
}

/// Revoke an installation token, see [`GithubClient::revoke_token`].
pub async fn revoke_token(config: &RevokeConfig) -> Result<(), Error> {
    GithubClient::new().revoke_token(config).await
}
