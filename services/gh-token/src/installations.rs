//! Listing the installations of a GitHub App.

use std::time::Duration;

use api_client::ApiClient;
use http::StatusCode;
use serde::Serialize;

use crate::auth::AppJwt;
use crate::client::GithubClient;
use crate::error::{Operation, RequestError, RequestErrorKind};
use crate::host::Host;
use crate::models::Installation;

const INSTALLATIONS_ENDPOINT: &str = "app/installations";

/// Installations requested per page. A shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// Pause between page requests, to stay clear of secondary rate limits.
pub const PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct PageQuery {
    per_page: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
}

impl GithubClient {
    /// List all installations of the App behind `jwt`.
    ///
    /// Pages are fetched one at a time, starting from page 0, until a page
    /// holds fewer than [`PAGE_SIZE`] entries. Any failed page fails the
    /// whole listing.
    #[tracing::instrument(skip_all, fields(%host))]
    pub async fn installations(
        &self,
        host: &Host,
        jwt: &AppJwt,
    ) -> Result<Vec<Installation>, RequestError> {
        let api = self.api(host, jwt.clone());
        let mut installations = Vec::new();
        let mut page = 0;

        loop {
            let query = PageQuery {
                per_page: PAGE_SIZE,
                page: Some(page),
            };
            tracing::trace!(page, "Requesting installations page");
            let batch = self
                .fetch_installations(&api, host, Operation::ListInstallations, &query)
                .await?;

            let count = batch.len();
            installations.extend(batch);
            if count < PAGE_SIZE {
                break;
            }

            page += 1;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        tracing::debug!("Found {} installations", installations.len());
        Ok(installations)
    }

    /// The first installation of the App behind `jwt`.
    ///
    /// Only the first page, of size one, is requested.
    #[tracing::instrument(skip_all, fields(%host))]
    pub async fn default_installation(
        &self,
        host: &Host,
        jwt: &AppJwt,
    ) -> Result<Installation, RequestError> {
        let api = self.api(host, jwt.clone());
        let query = PageQuery {
            per_page: 1,
            page: None,
        };

        let installation = self
            .fetch_installations(&api, host, Operation::DefaultInstallation, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RequestError::new(
                    Operation::DefaultInstallation,
                    host,
                    RequestErrorKind::NoInstallation,
                )
            })?;

        tracing::debug!(id = installation.id, "Using default installation");
        Ok(installation)
    }

    async fn fetch_installations(
        &self,
        api: &ApiClient<AppJwt>,
        host: &Host,
        operation: Operation,
        query: &PageQuery,
    ) -> Result<Vec<Installation>, RequestError> {
        let response = api
            .get(INSTALLATIONS_ENDPOINT)
            .query(query)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|err| RequestError::new(operation, host, err))?
            .expect_status(StatusCode::OK)
            .await
            .map_err(|err| RequestError::new(operation, host, err))?;

        let body = response
            .bytes()
            .await
            .map_err(|err| RequestError::new(operation, host, err))?;

        serde_json::from_slice(&body).map_err(|err| RequestError::new(operation, host, err))
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::client::tests::mock_client;
    use crate::error::{Error, ErrorKind};
    use crate::key::tests::test_key;

    fn jwt() -> AppJwt {
        AppJwt::sign("123456", 1, test_key()).unwrap()
    }

    fn page(start: u64, len: usize) -> Vec<u8> {
        let items: Vec<_> = (0..len as u64)
            .map(|offset| {
                serde_json::json!({
                    "id": start + offset,
                    "account": {"login": format!("account-{}", start + offset), "id": start + offset},
                })
            })
            .collect();
        serde_json::to_vec(&items).unwrap()
    }

    fn page_path(page: usize) -> String {
        format!("/app/installations?per_page=100&page={page}")
    }

    #[tokio::test(start_paused = true)]
    async fn pages_until_short_page() {
        let (client, mock) = mock_client();
        mock.add(Method::GET, &page_path(0), StatusCode::OK, page(0, 100));
        mock.add(Method::GET, &page_path(1), StatusCode::OK, page(100, 100));
        mock.add(Method::GET, &page_path(2), StatusCode::OK, page(200, 50));

        let started = tokio::time::Instant::now();
        let installations = client.installations(&Host::default(), &jwt()).await.unwrap();

        assert_eq!(installations.len(), 250);
        assert_eq!(installations[0].id, 0);
        assert_eq!(installations[249].id, 249);

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        for (index, request) in requests.iter().enumerate() {
            assert_eq!(request.method, Method::GET);
            assert_eq!(
                request.uri.to_string(),
                format!("https://api.github.com/app/installations?per_page=100&page={index}")
            );
            assert!(request.headers["authorization"]
                .to_str()
                .unwrap()
                .starts_with("Bearer ey"));
        }

        // One pause between each pair of pages, none after the last.
        assert_eq!(started.elapsed(), PAGE_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn single_short_page() {
        let (client, mock) = mock_client();
        mock.add(Method::GET, &page_path(0), StatusCode::OK, page(1, 2));

        let started = tokio::time::Instant::now();
        let installations = client.installations(&Host::default(), &jwt()).await.unwrap();

        assert_eq!(installations.len(), 2);
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_after_full_page() {
        let (client, mock) = mock_client();
        mock.add(Method::GET, &page_path(0), StatusCode::OK, page(0, 100));
        mock.add(Method::GET, &page_path(1), StatusCode::OK, b"[]".to_vec());

        let installations = client.installations(&Host::default(), &jwt()).await.unwrap();

        assert_eq!(installations.len(), 100);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_page_discards_earlier_pages() {
        let (client, mock) = mock_client();
        mock.add(Method::GET, &page_path(0), StatusCode::OK, page(0, 100));
        mock.add(
            Method::GET,
            &page_path(1),
            StatusCode::BAD_GATEWAY,
            b"upstream".to_vec(),
        );

        let error = client
            .installations(&Host::default(), &jwt())
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(error.operation(), Operation::ListInstallations);
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn malformed_page_is_decode_error() {
        let (client, mock) = mock_client();
        mock.add(
            Method::GET,
            &page_path(0),
            StatusCode::OK,
            br#"{"total_count": 1}"#.to_vec(),
        );

        let error: Error = client
            .installations(&Host::default(), &jwt())
            .await
            .unwrap_err()
            .into();

        assert_eq!(error.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn enterprise_listing() {
        let (client, mock) = mock_client();
        mock.add(
            Method::GET,
            "/api/v3/app/installations?per_page=100&page=0",
            StatusCode::OK,
            page(5, 1),
        );

        let host = Host::resolve("ghe.example.com");
        let installations = client.installations(&host, &jwt()).await.unwrap();

        assert_eq!(installations[0].id, 5);
        assert_eq!(
            mock.requests()[0].uri.to_string(),
            "https://ghe.example.com/api/v3/app/installations?per_page=100&page=0"
        );
    }

    #[tokio::test]
    async fn default_installation_is_first_of_first_page() {
        let (client, mock) = mock_client();
        mock.add(
            Method::GET,
            "/app/installations?per_page=1",
            StatusCode::OK,
            page(12345, 3),
        );

        let installation = client
            .default_installation(&Host::default(), &jwt())
            .await
            .unwrap();

        assert_eq!(installation.id, 12345);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn enterprise_accounts_do_not_break_listing() {
        let (client, mock) = mock_client();
        let body = br#"[
            {"id": 1, "account": {"id": 2, "slug": "big-corp", "name": "Big Corp"}, "target_type": "Enterprise"},
            {"id": 3, "account": {"login": "octo-org", "id": 4}, "target_type": "Organization"}
        ]"#;
        mock.add(Method::GET, &page_path(0), StatusCode::OK, body.to_vec());
        mock.add(
            Method::GET,
            "/app/installations?per_page=1",
            StatusCode::OK,
            body.to_vec(),
        );

        let installations = client.installations(&Host::default(), &jwt()).await.unwrap();
        assert_eq!(installations.len(), 2);
        assert_eq!(installations[0].account.as_ref().unwrap().extra["slug"], "big-corp");

        let first = client
            .default_installation(&Host::default(), &jwt())
            .await
            .unwrap();
        assert_eq!(first.id, 1);
    }

    #[tokio::test]
    async fn default_installation_requires_one() {
        let (client, mock) = mock_client();
        mock.add(
            Method::GET,
            "/app/installations?per_page=1",
            StatusCode::OK,
            b"[]".to_vec(),
        );

        let error: Error = client
            .default_installation(&Host::default(), &jwt())
            .await
            .unwrap_err()
            .into();

        assert_eq!(error.kind(), ErrorKind::NoInstallation);
    }
}
