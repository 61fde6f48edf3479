//! Small authenticated HTTP client for JSON APIs, built on `hyperdriver`.

use http::Method;
use hyperdriver::service::SharedService;
pub use secret::Secret;
use tower::ServiceExt;

mod authentication;
pub mod error;
pub mod mock;
pub mod request;
pub mod response;

pub use self::authentication::{bearer_auth, Authentication, BearerAuth};
pub use self::error::{Error, HttpResponseError};
pub use self::request::RequestBuilder;
pub use self::response::ApiResponse;

/// A client for accessing APIs over HTTP / HTTPS
///
/// Every request is sent to `{base}/{endpoint}` and authenticated with `A`.
/// Useful inner object to wrap for individual API clients.
#[derive(Debug, Clone)]
pub struct ApiClient<A> {
    base: String,
    inner: hyperdriver::client::SharedClientService<hyperdriver::Body, hyperdriver::Body>,
    authentication: A,
}

impl<A> ApiClient<A>
where
    A: Authentication + Send + Sync + 'static,
{
    /// Create a new API Client from a base URL, an authentication method and a transport.
    ///
    /// The base URL is used verbatim, so a trailing slash on it is kept.
    pub fn new_with_inner_service<S>(base: impl Into<String>, authentication: A, inner: S) -> Self
    where
        S: tower::Service<
                http::Request<hyperdriver::Body>,
                Response = http::Response<hyperdriver::Body>,
                Error = hyperdriver::client::Error,
            > + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let service = tower::ServiceBuilder::new()
            .layer(SharedService::layer())
            .service(inner);

        ApiClient {
            base: base.into(),
            inner: service,
            authentication,
        }
    }
}

impl<A> ApiClient<A> {
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base, endpoint.trim_start_matches('/'))
    }
}

impl<A> ApiClient<A>
where
    A: Authentication,
{
    pub fn get(&self, endpoint: &str) -> RequestBuilder<A> {
        RequestBuilder::new(self.clone(), self.url(endpoint), Method::GET)
    }

    pub fn post(&self, endpoint: &str) -> RequestBuilder<A> {
        RequestBuilder::new(self.clone(), self.url(endpoint), Method::POST)
    }

    pub fn delete(&self, endpoint: &str) -> RequestBuilder<A> {
        RequestBuilder::new(self.clone(), self.url(endpoint), Method::DELETE)
    }

    /// Authenticate and send a fully built request.
    pub async fn execute(&self, req: http::Request<hyperdriver::Body>) -> Result<ApiResponse, Error> {
        let req = self.authentication.authenticate(req)?;
        let method = req.method().clone();
        let uri = req.uri().clone();

        tracing::trace!(%method, %uri, "Sending request");
        let response = self.inner.clone().oneshot(req).await?;
        Ok(ApiResponse::new(method, uri, response))
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn client(mock: mock::MockService) -> ApiClient<BearerAuth> {
        ApiClient::new_with_inner_service(
            "https://api.example.com",
            BearerAuth::new(Secret::from("secret garden")),
            mock,
        )
    }

    #[test]
    fn extensions_produce_send_futures() {
        let client = client(mock::MockService::new());
        let builder = client.get("frobulator");

        fn assert_send<T: Send>(_t: T) {}

        let fut = builder.send();
        assert_send(fut);
    }

    #[tokio::test]
    async fn mock_client_works() {
        let mock = mock::MockService::new();
        mock.add(Method::GET, "/get", http::StatusCode::OK, b"frobulator".to_vec());

        let response = client(mock.clone()).get("/get").send().await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "frobulator");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers["authorization"], "Bearer secret garden");
    }

    #[tokio::test]
    async fn query_is_appended() {
        let mock = mock::MockService::new();
        mock.add(
            Method::GET,
            "/items?per_page=100&page=0",
            http::StatusCode::OK,
            b"[]".to_vec(),
        );

        client(mock.clone())
            .get("items")
            .query(&[("per_page", 100), ("page", 0)])
            .send()
            .await
            .unwrap();

        assert_eq!(
            mock.requests()[0].uri.to_string(),
            "https://api.example.com/items?per_page=100&page=0"
        );
    }

    #[test]
    fn base_url_is_used_verbatim() {
        let client = ApiClient::new_with_inner_service(
            "https://ghe.example.com/api/v3/",
            BearerAuth::new("token"),
            mock::MockService::new(),
        );
        assert_eq!(
            client.url("installation/token"),
            "https://ghe.example.com/api/v3//installation/token"
        );
    }

    #[tokio::test]
    async fn unexpected_status_is_an_error() {
        let mock = mock::MockService::new();
        mock.add(
            Method::DELETE,
            "/installation/token",
            http::StatusCode::UNAUTHORIZED,
            br#"{"message":"Bad credentials"}"#.to_vec(),
        );

        let error = client(mock)
            .delete("installation/token")
            .send()
            .await
            .unwrap()
            .expect_status(http::StatusCode::NO_CONTENT)
            .await
            .unwrap_err();

        assert_eq!(error.status, http::StatusCode::UNAUTHORIZED);
        assert!(error.message.contains("Bad credentials"));
        assert_eq!(error.to_string(), "unexpected status code: 401");
    }

    #[tokio::test]
    async fn invalid_credentials_fail_before_sending() {
        let mock = mock::MockService::new();
        let client = ApiClient::new_with_inner_service(
            "https://api.example.com",
            BearerAuth::new(Secret::from("bad\ntoken")),
            mock.clone(),
        );

        let error = client.get("anything").send().await.unwrap_err();
        assert!(matches!(error, Error::Header(_)));
        assert!(mock.requests().is_empty());
    }
}
