//! Signing the App JWT.

use chrono::{DateTime, Duration, Utc};
use jaws::claims::{Claims, RegisteredClaims};
use jaws::crypto::rsa;
use jaws::token::Token;
use rsa::sha2::Sha256;
use secret::Secret;

use crate::auth::AppJwt;
use crate::error::SigningError;

/// Backdating applied to `iat` to tolerate clock drift against GitHub.
pub const CLOCK_DRIFT_OFFSET_SECONDS: i64 = 60;

/// Longest JWT lifetime GitHub accepts, in minutes.
pub const MAX_EXPIRY_MINUTES: i64 = 10;

const MIN_EXPIRY_MINUTES: i64 = 1;

/// Clamp a requested JWT lifetime to what GitHub accepts.
///
/// Anything outside `1..=10` minutes becomes 10 minutes.
pub fn clamp_expiry_minutes(requested: i64) -> i64 {
    if (MIN_EXPIRY_MINUTES..=MAX_EXPIRY_MINUTES).contains(&requested) {
        requested
    } else {
        MAX_EXPIRY_MINUTES
    }
}

impl AppJwt {
    /// Sign a JWT for `app_id` valid for `expiry_minutes` (clamped) from now.
    ///
    /// The key is consumed and dropped once the signature is made.
    pub fn sign(
        app_id: &str,
        expiry_minutes: i64,
        key: rsa::RsaPrivateKey,
    ) -> Result<Self, SigningError> {
        Self::sign_at(app_id, expiry_minutes, key, Utc::now())
    }

    /// Sign a JWT as if the current time were `now`.
    pub fn sign_at(
        app_id: &str,
        expiry_minutes: i64,
        key: rsa::RsaPrivateKey,
        now: DateTime<Utc>,
    ) -> Result<Self, SigningError> {
        let expiry_minutes = clamp_expiry_minutes(expiry_minutes);
        let issued_at = now - Duration::seconds(CLOCK_DRIFT_OFFSET_SECONDS);
        let expire_at = now + Duration::minutes(expiry_minutes);

        let claims: Claims<(), &str> = Claims {
            registered: RegisteredClaims {
                issuer: Some(app_id),
                issued_at: Some(issued_at),
                expiration: Some(expire_at),
                ..Default::default()
            },
            claims: (),
        };

        let jwt = Token::compact((), claims);
        let algorithm: rsa::pkcs1v15::SigningKey<Sha256> = rsa::pkcs1v15::SigningKey::new(key);
        let token =
            jwt.sign::<rsa::pkcs1v15::SigningKey<Sha256>, rsa::pkcs1v15::Signature>(&algorithm)?;

        let encoded: Secret = token.rendered()?.into();
        tracing::debug!(app = app_id, %expire_at, "Created a new GitHub App JWT");
        Ok(AppJwt::new(encoded))
    }
}
