use async_trait::async_trait;
use blobgate_core::{time, BearerToken, Context, Error, ProvideBearerToken, Result};

use crate::constants::*;

/// Obtain a vault token through Azure Workload Identity.
///
/// Applies when a federated token file is projected into the pod:
/// `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_FEDERATED_TOKEN_FILE`.
/// The file content is exchanged for an access token via the client
/// assertion grant.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/aks/workload-identity-overview>
#[derive(Debug, Default, Clone)]
pub struct WorkloadIdentityTokenProvider;

impl WorkloadIdentityTokenProvider {
    /// Create a new workload identity provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideBearerToken for WorkloadIdentityTokenProvider {
    async fn provide_token(&self, ctx: &Context) -> Result<Option<BearerToken>> {
        let envs = ctx.env_vars();

        let tenant_id = match envs.get(AZURE_TENANT_ID) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };
        let client_id = match envs.get(AZURE_CLIENT_ID) {
            Some(id) if !id.is_empty() => id,
            _ => return Ok(None),
        };
        let federated_token_file = match envs.get(AZURE_FEDERATED_TOKEN_FILE) {
            Some(file) if !file.is_empty() => file,
            _ => return Ok(None),
        };
        let authority_host = envs
            .get(AZURE_AUTHORITY_HOST)
            .filter(|h| !h.is_empty())
            .map(|s| s.as_str())
            .unwrap_or(AZURE_PUBLIC_CLOUD);

        let assertion = ctx.file_read_as_string(federated_token_file).await?;

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        );

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", KEY_VAULT_SCOPE)
            .append_pair("client_id", client_id)
            .append_pair(
                "client_assertion_type",
                "urn:ietf:params:oauth:client-assertion-type:jwt-bearer",
            )
            .append_pair("client_assertion", assertion.trim())
            .append_pair("grant_type", "client_credentials")
            .finish();

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&url)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(bytes::Bytes::from(body))
            .map_err(|e| {
                Error::vault_auth_denied("failed to build workload identity request")
                    .with_source(e)
            })?;

        let resp = ctx.http_send(req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::vault_auth_denied(format!(
                "workload identity token request failed with status {status}"
            )));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::vault_auth_denied("failed to parse workload identity token response")
                .with_source(e)
        })?;

        let lifetime = token
            .expires_in
            .and_then(|secs| chrono::TimeDelta::try_seconds(secs as i64))
            .unwrap_or_else(|| chrono::TimeDelta::try_minutes(10).expect("in bounds"));

        Ok(Some(BearerToken::new(
            &token.access_token,
            Some(time::now() + lifetime),
        )))
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::{FileRead, HttpSend, StaticEnv};
    use bytes::Bytes;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct ProjectedToken;

    #[async_trait]
    impl FileRead for ProjectedToken {
        async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
            assert_eq!(path, "/var/run/secrets/azure/tokens/azure-identity-token");
            Ok(b"federated-jwt\n".to_vec())
        }
    }

    #[derive(Debug)]
    struct TokenEndpoint;

    #[async_trait]
    impl HttpSend for TokenEndpoint {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let body = String::from_utf8_lossy(req.body());
            assert!(body.contains("client_assertion=federated-jwt"));

            Ok(http::Response::builder()
                .status(http::StatusCode::OK)
                .body(Bytes::from_static(br#"{"access_token":"widtoken"}"#))
                .unwrap())
        }
    }

    #[tokio::test]
    async fn test_returns_none_without_federation() {
        let provider = WorkloadIdentityTokenProvider::new();
        assert!(provider
            .provide_token(&Context::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_exchanges_federated_token() {
        let envs = HashMap::from([
            (AZURE_TENANT_ID.to_string(), "tenant".to_string()),
            (AZURE_CLIENT_ID.to_string(), "client".to_string()),
            (
                AZURE_FEDERATED_TOKEN_FILE.to_string(),
                "/var/run/secrets/azure/tokens/azure-identity-token".to_string(),
            ),
        ]);
        let ctx = Context::new()
            .with_env(StaticEnv { envs })
            .with_file_read(ProjectedToken)
            .with_http_send(TokenEndpoint);

        let token = WorkloadIdentityTokenProvider::new()
            .provide_token(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.token, "widtoken");
    }
}
