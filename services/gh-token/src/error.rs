//! Errors returned by the token lifecycle.

use std::fmt;
use std::io;

use api_client::HttpResponseError;
use http::StatusCode;
use jaws::crypto::rsa;
use jaws::crypto::signature;
use jaws::token::{TokenFormattingError, TokenSigningError};
use rsa::pkcs8::Error as Pkcs8Error;
use thiserror::Error;

use crate::host::Host;
use crate::key::KeyOrigin;

/// Broad category of an [`Error`], for callers which map failures onto exit
/// codes or user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or conflicting input, or input which cannot form a request.
    Config,
    /// File system or network transport failure, including timeouts.
    Io,
    /// Base64 decoding failed.
    Encoding,
    /// Key material is not a PEM encoded RSA private key.
    KeyFormat,
    /// The JWT could not be signed.
    Signing,
    /// The API answered with an unexpected status.
    Http,
    /// The API answered with a body that could not be decoded.
    Decode,
    /// The token exchange succeeded but returned no token.
    EmptyToken,
    /// The App has no installations to pick a default from.
    NoInstallation,
}

/// Errors that can occur while issuing or revoking tokens.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid combination of inputs.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The private key could not be loaded.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The App JWT could not be produced.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// A call to the API failed.
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Key(error) => error.kind(),
            Error::Signing(_) => ErrorKind::Signing,
            Error::Request(error) => error.kind(),
        }
    }

    /// The HTTP status, when the API answered with an unexpected one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request(error) => error.status(),
            _ => None,
        }
    }
}

/// Mutually exclusive inputs were both given, or neither was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No key source was supplied.
    #[error("either a key file or a base64 encoded key must be specified")]
    MissingKey,

    /// Both key sources were supplied.
    #[error("only one of a key file or a base64 encoded key may be specified")]
    ConflictingKeys,
}

#[derive(Debug, Error)]
pub enum KeyErrorKind {
    #[error("unable to read key file: {0}")]
    Io(#[from] io::Error),

    #[error("unable to decode key from base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("key is not valid UTF-8 PEM text: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unable to parse key from PEM to RSA format: {0}")]
    Pem(#[from] Pkcs8Error),
}

/// The private key could not be loaded from its source.
#[derive(Debug, Error)]
#[error("Reading GitHub App key from {origin}")]
pub struct KeyError {
    origin: KeyOrigin,
    #[source]
    kind: KeyErrorKind,
}

impl KeyError {
    pub(crate) fn new(origin: KeyOrigin, kind: impl Into<KeyErrorKind>) -> Self {
        Self {
            origin,
            kind: kind.into(),
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.kind {
            KeyErrorKind::Io(_) => ErrorKind::Io,
            KeyErrorKind::Base64(_) => ErrorKind::Encoding,
            KeyErrorKind::Utf8(_) | KeyErrorKind::Pem(_) => ErrorKind::KeyFormat,
        }
    }

    /// Where the key was being read from.
    pub fn origin(&self) -> &KeyOrigin {
        &self.origin
    }
}

/// An error that occurs when signing the App JWT.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The key could not produce a signature.
    #[error("unable to sign JWT: {0}")]
    Signature(#[from] signature::Error),

    /// The header or claims could not be serialized.
    #[error("unable to serialize JWT: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The signed token could not be rendered in compact form.
    #[error("unable to render JWT")]
    Rendering,
}

impl From<TokenSigningError> for SigningError {
    fn from(err: TokenSigningError) -> Self {
        match err {
            TokenSigningError::Signing(err) => err.into(),
            TokenSigningError::Serialization(err) => err.into(),
        }
    }
}

impl From<TokenFormattingError> for SigningError {
    fn from(value: TokenFormattingError) -> Self {
        match value {
            TokenFormattingError::Serialization(error) => error.into(),
            TokenFormattingError::IO(_) => SigningError::Rendering,
        }
    }
}

/// The API call being made when a [`RequestError`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing every installation of the App.
    ListInstallations,
    /// Looking up the first installation of the App.
    DefaultInstallation,
    /// Exchanging the App JWT for an installation token.
    CreateToken {
        /// Installation the token is for.
        installation_id: u64,
    },
    /// Revoking an installation token.
    RevokeToken,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ListInstallations => f.write_str("listing installations"),
            Operation::DefaultInstallation => f.write_str("retrieving default installation"),
            Operation::CreateToken { installation_id } => {
                write!(f, "creating token for installation {installation_id}")
            }
            Operation::RevokeToken => f.write_str("revoking installation token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RequestErrorKind {
    #[error(transparent)]
    Client(#[from] api_client::Error),

    #[error(transparent)]
    Status(#[from] HttpResponseError),

    #[error("unable to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response contained an empty token")]
    EmptyToken,

    #[error("no installations found for this app")]
    NoInstallation,
}

/// A call to the API failed.
#[derive(Debug)]
pub struct RequestError {
    operation: Operation,
    host: Host,
    kind: RequestErrorKind,
}

impl RequestError {
    pub(crate) fn new(operation: Operation, host: &Host, kind: impl Into<RequestErrorKind>) -> Self {
        Self {
            operation,
            host: host.clone(),
            kind: kind.into(),
        }
    }

    /// The call that failed.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The API host the call was made against.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// The HTTP status, when the API answered with an unexpected one.
    pub fn status(&self) -> Option<StatusCode> {
        match &self.kind {
            RequestErrorKind::Status(error) => Some(error.status),
            _ => None,
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match &self.kind {
            RequestErrorKind::Client(error) if error.is_transport() => ErrorKind::Io,
            RequestErrorKind::Client(_) => ErrorKind::Config,
            RequestErrorKind::Status(_) => ErrorKind::Http,
            RequestErrorKind::Decode(_) => ErrorKind::Decode,
            RequestErrorKind::EmptyToken => ErrorKind::EmptyToken,
            RequestErrorKind::NoInstallation => ErrorKind::NoInstallation,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}: {}", self.operation, self.host, self.kind)?;
        if let (Operation::RevokeToken, RequestErrorKind::Status(_)) = (&self.operation, &self.kind)
        {
            f.write_str(" (the token might be invalid, expired, or already revoked)")?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
