//! Authentication for API clients.
//!
//! The `Authentication` trait is used to authenticate requests sent via the `ApiClient`.
//! Credential types implement it, usually by delegating to [`bearer_auth`].

use http::header::InvalidHeaderValue;
use secret::Secret;

/// Trait to represent authenticating with an API queried via the `ApiClient`.
pub trait Authentication: Clone {
    /// Called by the `ApiClient` on every request before it is sent.
    fn authenticate<B>(&self, req: http::Request<B>) -> Result<http::Request<B>, InvalidHeaderValue>;
}

/// Attach `Authorization: Bearer <token>` to a request.
///
/// An authorization header which is already present is left alone.
pub fn bearer_auth<B>(
    token: &Secret,
    mut req: http::Request<B>,
) -> Result<http::Request<B>, InvalidHeaderValue> {
    if req.headers().contains_key(http::header::AUTHORIZATION) {
        tracing::warn!("{} header already set", http::header::AUTHORIZATION);
        return Ok(req);
    }

    let value = token.bearer()?;
    req.headers_mut()
        .insert(http::header::AUTHORIZATION, value);
    Ok(req)
}

/// Authentication with a bearer token, often used with an API key.
///
/// # Example
/// ```rust
/// use api_client::{Authentication, BearerAuth};
///
/// let auth = BearerAuth::new("my-secret");
/// let req = auth.authenticate(http::Request::new(())).unwrap();
///
/// assert_eq!(req.headers()["authorization"], "Bearer my-secret");
/// ```
#[derive(Debug, Clone)]
pub struct BearerAuth(Secret);

impl BearerAuth {
    /// Create a new Bearer authentication with a given key.
    pub fn new<K: Into<Secret>>(key: K) -> Self {
        BearerAuth(key.into())
    }
}

impl Authentication for BearerAuth {
    fn authenticate<B>(&self, req: http::Request<B>) -> Result<http::Request<B>, InvalidHeaderValue> {
        bearer_auth(&self.0, req)
    }
}
