use async_trait::async_trait;
use blobgate_core::{time, BearerToken, Context, Error, ProvideBearerToken, Result};

use crate::constants::*;

/// Obtain a vault token through the client credentials flow.
///
/// Applies when a service principal is configured in the environment:
/// `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/active-directory/develop/v2-oauth2-client-creds-grant-flow>
#[derive(Debug, Default, Clone)]
pub struct ClientSecretTokenProvider;

impl ClientSecretTokenProvider {
    /// Create a new client secret provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideBearerToken for ClientSecretTokenProvider {
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
        let client_secret = match envs.get(AZURE_CLIENT_SECRET) {
            Some(secret) if !secret.is_empty() => secret,
            _ => return Ok(None),
        };
        let authority_host = envs
            .get(AZURE_AUTHORITY_HOST)
            .filter(|h| !h.is_empty())
            .map(|s| s.as_str())
            .unwrap_or(AZURE_PUBLIC_CLOUD);

        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            tenant_id
        );

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("scope", KEY_VAULT_SCOPE)
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret)
            .append_pair("grant_type", "client_credentials")
            .finish();

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&url)
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(bytes::Bytes::from(body))
            .map_err(|e| {
                Error::vault_auth_denied("failed to build client secret request").with_source(e)
            })?;

        let resp = ctx.http_send(req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::vault_auth_denied(format!(
                "client secret token request failed with status {status}"
            )));
        }

        let token: TokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::vault_auth_denied("failed to parse client secret token response")
                .with_source(e)
        })?;

        let expires_on = time::now()
            + chrono::TimeDelta::try_seconds(token.expires_in as i64)
                .unwrap_or_else(|| chrono::TimeDelta::try_minutes(10).expect("in bounds"));

        Ok(Some(BearerToken::new(&token.access_token, Some(expires_on))))
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::{HttpSend, StaticEnv};
    use bytes::Bytes;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct TokenEndpoint;

    #[async_trait]
    impl HttpSend for TokenEndpoint {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let uri = req.uri().to_string();
            assert!(uri.ends_with("/tenant/oauth2/v2.0/token"));

            let body = String::from_utf8_lossy(req.body());
            assert!(body.contains("grant_type=client_credentials"));
            assert!(body.contains("vault.azure.net"));

            Ok(http::Response::builder()
                .status(http::StatusCode::OK)
                .body(Bytes::from_static(
                    br#"{"access_token":"aadtoken","expires_in":3600,"token_type":"Bearer"}"#,
                ))
                .unwrap())
        }
    }

    #[tokio::test]
    async fn test_returns_none_without_service_principal() {
        let provider = ClientSecretTokenProvider::new();
        assert!(provider
            .provide_token(&Context::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_requests_token_for_vault_scope() {
        let envs = HashMap::from([
            (AZURE_TENANT_ID.to_string(), "tenant".to_string()),
            (AZURE_CLIENT_ID.to_string(), "client".to_string()),
            (AZURE_CLIENT_SECRET.to_string(), "secret".to_string()),
        ]);
        let ctx = Context::new()
            .with_env(StaticEnv { envs })
            .with_http_send(TokenEndpoint);

        let token = ClientSecretTokenProvider::new()
            .provide_token(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.token, "aadtoken");
        assert!(token.is_valid());
    }
}
