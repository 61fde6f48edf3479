//! Loading the GitHub App private key.

use std::fmt;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use camino::{Utf8Path, Utf8PathBuf};
use jaws::crypto::rsa;
use rsa::{pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey};
use secret::{Secret, SecretBytes};

use crate::error::{ConfigError, KeyError};

/// Where private key material comes from. Exactly one source is allowed.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// A PEM file on disk.
    File(Utf8PathBuf),
    /// PEM text, base64 encoded with the standard alphabet.
    Base64(Secret),
}

/// Describes a [`KeySource`] in errors, without the key itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Key file path.
    File(Utf8PathBuf),
    /// Inline base64 input.
    Base64,
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrigin::File(path) => write!(f, "{path:?}"),
            KeyOrigin::Base64 => f.write_str("base64 input"),
        }
    }
}

impl KeySource {
    /// Pick the key source from two optional inputs, of which exactly one must be set.
    pub fn from_options(
        file: Option<Utf8PathBuf>,
        base64: Option<Secret>,
    ) -> Result<Self, ConfigError> {
        match (file, base64) {
            (Some(path), None) => Ok(KeySource::File(path)),
            (None, Some(encoded)) => Ok(KeySource::Base64(encoded)),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingKeys),
            (None, None) => Err(ConfigError::MissingKey),
        }
    }

    /// Describe this source for error messages.
    pub fn origin(&self) -> KeyOrigin {
        match self {
            KeySource::File(path) => KeyOrigin::File(path.clone()),
            KeySource::Base64(_) => KeyOrigin::Base64,
        }
    }

    /// Read and parse the RSA private key.
    pub fn load(&self) -> Result<rsa::RsaPrivateKey, KeyError> {
        let pem = self.read()?;
        rsa_key_from_pem(&pem).map_err(|kind| KeyError::new(self.origin(), kind))
    }

    fn read(&self) -> Result<SecretBytes, KeyError> {
        match self {
            KeySource::File(path) => read_key_file(path),
            KeySource::Base64(encoded) => {
                // Line breaks from wrapped output are skipped; other whitespace is invalid.
                let compact: Secret = encoded
                    .revealed()
                    .chars()
                    .filter(|c| !matches!(c, '\r' | '\n'))
                    .collect::<String>()
                    .into();
                BASE64_STANDARD
                    .decode(compact.revealed())
                    .map(SecretBytes::from)
                    .map_err(|err| KeyError::new(self.origin(), err))
            }
        }
    }
}

fn read_key_file(path: &Utf8Path) -> Result<SecretBytes, KeyError> {
    let bytes = std::fs::read(path)
        .map_err(|err| KeyError::new(KeyOrigin::File(path.to_path_buf()), err))?;
    tracing::trace!(%path, "Read GitHub App key file");
    Ok(SecretBytes::from(bytes))
}

/// Parse PEM text as PKCS#1 (GitHub's format), falling back to PKCS#8.
fn rsa_key_from_pem(pem: &SecretBytes) -> Result<rsa::RsaPrivateKey, crate::error::KeyErrorKind> {
    let text = std::str::from_utf8(pem.revealed())?;

    match rsa::RsaPrivateKey::from_pkcs1_pem(text) {
        Ok(key) => Ok(key),
        Err(pkcs1_error) => match rsa::RsaPrivateKey::from_pkcs8_pem(text) {
            Ok(key) => Ok(key),
            Err(pkcs8_error) => {
                tracing::debug!("Error reading as PKCS1: {}", pkcs1_error);
                tracing::debug!("Error reading as PKCS8: {}", pkcs8_error);
                Err(pkcs8_error.into())
            }
        },
    }
}
