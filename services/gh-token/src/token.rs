use http::StatusCode;

use crate::auth::AppJwt;
use crate::client::GithubClient;
use crate::error::{Operation, RequestError, RequestErrorKind};
use crate::host::Host;
use crate::models::{AccessTokenResponse, InstallationAccess};

impl GithubClient {
    /// Exchange the App JWT for an access token scoped to one installation.
    ///
    /// Only `201 Created` is accepted. A response without a token, or with
    /// an empty one, is an error rather than an empty credential.
    #[tracing::instrument(skip_all, fields(%host, installation_id = installation_id))]
    pub async fn create_installation_token(
        &self,
        host: &Host,
        jwt: &AppJwt,
        installation_id: u64,
    ) -> Result<InstallationAccess, RequestError> {
        let operation = Operation::CreateToken { installation_id };
        let endpoint = format!("app/installations/{installation_id}/access_tokens");

        let response = self
            .api(host, jwt.clone())
            .post(&endpoint)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|err| RequestError::new(operation, host, err))?
            .expect_status(StatusCode::CREATED)
            .await
            .map_err(|err| RequestError::new(operation, host, err))?;

        let body = response
            .bytes()
            .await
            .map_err(|err| RequestError::new(operation, host, err))?;

        let access = serde_json::from_slice::<AccessTokenResponse>(&body)
            .map_err(|err| RequestError::new(operation, host, err))?
            .into_access()
            .ok_or_else(|| RequestError::new(operation, host, RequestErrorKind::EmptyToken))?;

        tracing::debug!(expires_at = %access.expires_at, "Issued installation token");
        Ok(access)
    }
}
