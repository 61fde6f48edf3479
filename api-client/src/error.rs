//! Error types for API Clients
use std::fmt;

use http::header::InvalidHeaderValue;
use http::StatusCode;
use thiserror::Error;

use crate::response::ApiResponse;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error occured while building, sending or recieving an HTTP request
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be assembled (bad URI, bad method).
    #[error("Building request: {0}")]
    Build(#[from] http::Error),

    /// Query parameters could not be encoded.
    #[error("Encoding query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// A credential could not be expressed as a header value.
    #[error("Invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// An error occured while sending the request
    #[error("Sending request: {0}")]
    Request(#[from] hyperdriver::client::Error),

    /// The request did not complete before its deadline.
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// An error occured while recieving the response body
    #[error("Error reading response body: {0}")]
    ResponseBody(#[source] BoxError),
}

impl Error {
    /// True when the failure happened on the wire rather than while
    /// preparing the request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Request(_) | Error::Timeout(_) | Error::ResponseBody(_)
        )
    }
}

/// A server returned a response with an unexpected status
#[derive(Debug, Clone)]
pub struct HttpResponseError {
    /// The HTTP status code of the response
    pub status: StatusCode,

    /// The message body of the response
    pub message: String,
}

impl HttpResponseError {
    /// Create a new HTTP response error from a response
    pub async fn from_response(response: ApiResponse) -> Self {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|err| format!("Failed to read response body: {}", err));

        Self { status, message }
    }
}

impl fmt::Display for HttpResponseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unexpected status code: {}", self.status.as_u16())
    }
}

impl std::error::Error for HttpResponseError {}
