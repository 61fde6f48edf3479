//! The HTTP transport shared by every GitHub API call.

use std::time::Duration;

use api_client::{ApiClient, Authentication};
use http::{header, HeaderName, HeaderValue};
use hyperdriver::client::conn::transport::tcp::TcpTransportConfig;
use hyperdriver::service::SharedService;
use hyperdriver::{Body, Client};
use tower_http::set_header::SetRequestHeaderLayer;

use crate::host::Host;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const TIMEOUT: Duration = Duration::from_secs(60);
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const USER_AGENT: &str = concat!("gh-token/", env!("CARGO_PKG_VERSION"));

/// Transport for talking to the GitHub API as an App or as an installation.
///
/// Every request carries the GitHub media type, the pinned API version and
/// the `gh-token` user agent. Credentials are supplied per call.
#[derive(Debug, Clone)]
pub struct GithubClient {
    service: hyperdriver::client::SharedClientService<Body, Body>,
    timeout: Duration,
}

impl GithubClient {
    /// Create a client which connects to GitHub over HTTPS.
    pub fn new() -> Self {
        let mut tcp = TcpTransportConfig::default();
        tcp.connect_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::builder()
            .with_tcp(tcp)
            .with_default_tls()
            .with_auto_http()
            .with_user_agent(USER_AGENT.to_owned())
            .build_service();

        Self::with_service(client)
    }

    /// Create a client on top of an arbitrary transport, such as a mock.
    pub fn with_service<S>(inner: S) -> Self
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
            .layer(SetRequestHeaderLayer::if_not_present(
                header::ACCEPT,
                HeaderValue::from_static(GITHUB_ACCEPT),
            ))
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static(GITHUB_API_VERSION_HEADER),
                HeaderValue::from_static(GITHUB_API_VERSION),
            ))
            .layer(SetRequestHeaderLayer::if_not_present(
                header::USER_AGENT,
                HeaderValue::from_static(USER_AGENT),
            ))
            .service(inner);

        Self {
            service,
            timeout: TIMEOUT,
        }
    }

    /// Limit how long each request may take. Defaults to 60 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-request deadline.
    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// An API client for `host` authenticated with `auth`.
    pub(crate) fn api<A>(&self, host: &Host, auth: A) -> ApiClient<A>
    where
        A: Authentication + Send + Sync + 'static,
    {
        ApiClient::new_with_inner_service(host.base_url(), auth, self.service.clone())
    }
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}
