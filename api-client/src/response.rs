//! Response types for working with HTTP responses.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt as _;
use hyperdriver::Body;
use tokio::time::Instant;

use crate::error::{BoxError, Error, HttpResponseError};

/// Point in time by which a request, body included, must have completed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    pub(crate) at: Instant,
    timeout: Duration,
}

impl Deadline {
    pub(crate) fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }
}

/// Wrapper around an HTTP response which remembers the request that produced it.
#[derive(Debug)]
pub struct ApiResponse {
    method: http::Method,
    uri: http::Uri,
    response: http::response::Parts,
    body: Body,
    deadline: Option<Deadline>,
}

impl ApiResponse {
    /// Create a new `ApiResponse` from the request line and the raw response.
    pub fn new(method: http::Method, uri: http::Uri, response: http::Response<Body>) -> Self {
        let (response, body) = response.into_parts();

        Self {
            method,
            uri,
            response,
            body,
            deadline: None,
        }
    }

    pub(crate) fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Get the status code of the response.
    pub fn status(&self) -> http::StatusCode {
        self.response.status
    }

    /// Collect the response body.
    ///
    /// When the request was sent with a timeout, collection fails with
    /// [`Error::Timeout`] once the deadline passes.
    pub async fn bytes(self) -> Result<Bytes, Error> {
        collect_body(self.body, self.deadline).await
    }

    /// Collect the response body as UTF-8 text.
    pub async fn text(self) -> Result<String, Error> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|error| Error::ResponseBody(error.into()))
    }

    /// Convert the `ApiResponse` into an `HttpResponseError`.
    pub async fn into_error(self) -> HttpResponseError {
        HttpResponseError::from_response(self).await
    }

    /// Pass the response through only when it carries exactly `expected`.
    ///
    /// Any other status, including other 2xx codes, becomes an [`HttpResponseError`].
    pub async fn expect_status(
        self,
        expected: http::StatusCode,
    ) -> Result<Self, HttpResponseError> {
        if self.status() == expected {
            Ok(self)
        } else {
            tracing::debug!(
                method = %self.method,
                uri = %self.uri,
                status = %self.status(),
                "Unexpected response status"
            );
            Err(self.into_error().await)
        }
    }
}

async fn collect_body<B>(body: B, deadline: Option<Deadline>) -> Result<Bytes, Error>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    let collecting = body.collect();
    let collected = match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, collecting)
            .await
            .map_err(|_| Error::Timeout(deadline.timeout))?,
        None => collecting.await,
    };

    collected
        .map(|collected| collected.to_bytes())
        .map_err(|error| Error::ResponseBody(error.into()))
}
