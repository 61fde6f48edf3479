//! An in-memory transport for testing API clients.
//!
//! Responses are keyed by method and path (including the query string).
//! Every request the service sees is recorded for later inspection.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use http::{response, HeaderMap, Method, StatusCode, Uri};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct MockResponse {
    status: StatusCode,
    body: Vec<u8>,
}

/// A request as seen by the [`MockService`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Full request URI.
    pub uri: Uri,
    /// Request headers, after every layer above the transport ran.
    pub headers: HeaderMap,
}

#[derive(Debug, Default)]
struct MockState {
    responses: HashMap<(Method, String), VecDeque<MockResponse>>,
    requests: Vec<RecordedRequest>,
}

/// A cloneable mock transport. Clones share responses and recorded requests.
#[derive(Debug, Default, Clone)]
pub struct MockService {
    state: Arc<Mutex<MockState>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` on `path`.
    ///
    /// `path` includes the query string, e.g. `/items?page=2`. Several
    /// responses for one key are served in order; the last one repeats.
    pub fn add(&self, method: Method, path: &str, status: StatusCode, body: Vec<u8>) {
        let response = MockResponse { status, body };
        self.state
            .lock()
            .responses
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(response);
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

impl tower::Service<http::Request<hyperdriver::Body>> for MockService {
    type Response = http::Response<hyperdriver::Body>;
    type Error = hyperdriver::client::Error;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<hyperdriver::Body>) -> Self::Future {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| "/".to_owned());
        let key = (req.method().clone(), path);

        let response = {
            let mut state = self.state.lock();
            state.requests.push(RecordedRequest {
                method: req.method().clone(),
                uri: req.uri().clone(),
                headers: req.headers().clone(),
            });

            let queue = state.responses.get_mut(&key).unwrap_or_else(|| {
                panic!(
                    "No response configured for {method} {path}",
                    method = key.0,
                    path = key.1
                )
            });
            if queue.len() > 1 {
                queue.pop_front().expect("queue is not empty")
            } else {
                queue.front().cloned().expect("queue is not empty")
            }
        };

        let response = response::Builder::new()
            .status(response.status)
            .version(http::Version::HTTP_11)
            .body(hyperdriver::Body::from(Bytes::from(response.body)))
            .unwrap();

        std::future::ready(Ok(response))
    }
}
