use http::StatusCode;

use crate::auth::InstallationToken;
use crate::client::GithubClient;
use crate::error::{Operation, RequestError};
use crate::host::Host;

const REVOKE_ENDPOINT: &str = "installation/token";

impl GithubClient {
    /// Revoke an installation token, authenticating with the token itself.
    ///
    /// Only `204 No Content` counts as success. A `401` usually means the
    /// token was already expired or revoked; callers who want to treat that
    /// as done can check [`RequestError::status`].
    #[tracing::instrument(skip_all, fields(%host))]
    pub async fn revoke_installation_token(
        &self,
        host: &Host,
        token: &InstallationToken,
    ) -> Result<(), RequestError> {
        let operation = Operation::RevokeToken;

        self.api(host, token.clone())
            .delete(REVOKE_ENDPOINT)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|err| RequestError::new(operation, host, err))?
            .expect_status(StatusCode::NO_CONTENT)
            .await
            .map_err(|err| RequestError::new(operation, host, err))?;

        tracing::debug!("Revoked installation token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::client::tests::mock_client;

    #[tokio::test]
    async fn revoke_succeeds_on_no_content() {
        let (client, mock) = mock_client();
        mock.add(
            Method::DELETE,
            "/installation/token",
            StatusCode::NO_CONTENT,
            Vec::new(),
        );

        client
            .revoke_installation_token(&Host::default(), &InstallationToken::new("ghs_abc"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::DELETE);
        assert_eq!(
            requests[0].uri.to_string(),
            "https://api.github.com/installation/token"
        );
        assert_eq!(requests[0].headers["authorization"], "Bearer ghs_abc");
    }

    #[tokio::test]
    async fn unauthorized_revoke_explains_itself() {
        let (client, mock) = mock_client();
        mock.add(
            Method::DELETE,
            "/installation/token",
            StatusCode::UNAUTHORIZED,
            br#"{"message":"Bad credentials"}"#.to_vec(),
        );

        let error = client
            .revoke_installation_token(&Host::default(), &InstallationToken::new("ghs_old"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(error.operation(), Operation::RevokeToken);
        assert_eq!(
            error.to_string(),
            "revoking installation token on api.github.com: unexpected status code: 401 \
             (the token might be invalid, expired, or already revoked)"
        );
    }

    #[tokio::test]
    async fn ok_is_not_no_content() {
        let (client, mock) = mock_client();
        mock.add(
            Method::DELETE,
            "/installation/token",
            StatusCode::OK,
            b"{}".to_vec(),
        );

        let error = client
            .revoke_installation_token(&Host::default(), &InstallationToken::new("ghs_abc"))
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn enterprise_trailing_slash_is_kept() {
        let (client, mock) = mock_client();
        mock.add(
            Method::DELETE,
            "//api/v3/installation/token",
            StatusCode::NO_CONTENT,
            Vec::new(),
        );

        client
            .revoke_installation_token(
                &Host::resolve("ghe.example.com/"),
                &InstallationToken::new("ghs_abc"),
            )
            .await
            .unwrap();

        assert_eq!(
            mock.requests()[0].uri.to_string(),
            "https://ghe.example.com//api/v3/installation/token"
        );
    }
}
