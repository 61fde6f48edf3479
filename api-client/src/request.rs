use std::time::Duration;

use http::{header::HeaderValue, HeaderName};
use serde::Serialize;

use crate::error::Error;
use crate::response::{ApiResponse, Deadline};
use crate::{ApiClient, Authentication};

/// Builder for a single request against an [`ApiClient`].
///
/// Errors from the builder methods are deferred until [`RequestBuilder::send`].
#[derive(Debug)]
pub struct RequestBuilder<A> {
    req: http::request::Builder,
    client: ApiClient<A>,
    uri: String,
    query: Option<Result<String, serde_urlencoded::ser::Error>>,
    body: Option<hyperdriver::Body>,
    timeout: Option<Duration>,
}

impl<A> RequestBuilder<A> {
    pub fn new(client: ApiClient<A>, uri: String, method: http::Method) -> Self {
        Self {
            req: http::Request::builder().method(method),
            client,
            uri,
            query: None,
            body: None,
            timeout: None,
        }
    }

    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.req = self.req.header(key, value);
        self
    }

    /// Set the query string, replacing any query set previously.
    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.query = Some(serde_urlencoded::to_string(query));
        self
    }

    /// Fail the request with [`Error::Timeout`] if it has not completed within `timeout`.
    ///
    /// The deadline covers receiving the response and collecting its body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn body<B: Into<hyperdriver::Body>>(self, body: B) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    pub async fn send(self) -> Result<ApiResponse, Error>
    where
        A: Authentication,
    {
        let uri = match self.query {
            Some(query) => format!("{}?{}", self.uri, query?),
            None => self.uri,
        };

        let req = self
            .req
            .uri(uri)
            .body(self.body.unwrap_or_else(hyperdriver::Body::empty))?;

        let Some(timeout) = self.timeout else {
            return self.client.execute(req).await;
        };

        // The deadline also bounds reading the body, see `ApiResponse::bytes`.
        let deadline = Deadline::after(timeout);
        match tokio::time::timeout_at(deadline.at, self.client.execute(req)).await {
            Ok(res) => res.map(|response| response.with_deadline(deadline)),
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }
}
