use async_trait::async_trait;
use blobgate_core::{time, BearerToken, Context, Error, ProvideBearerToken, Result};

use crate::constants::*;

/// Obtain a vault token from the Azure Instance Metadata Service.
///
/// Available on Azure VMs and other compute with a managed identity
/// attached; the metadata endpoint mints tokens without any secret in the
/// process environment.
///
/// Reference: <https://learn.microsoft.com/en-us/azure/app-service/overview-managed-identity?tabs=portal,http#using-the-rest-protocol>
#[derive(Debug, Default)]
pub struct ImdsTokenProvider;

impl ImdsTokenProvider {
    /// Create a new IMDS provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideBearerToken for ImdsTokenProvider {
    async fn provide_token(&self, ctx: &Context) -> Result<Option<BearerToken>> {
        let envs = ctx.env_vars();

        let endpoint = envs
            .get(AZURE_IMDS_ENDPOINT)
            .filter(|e| !e.is_empty())
            .map(|s| s.as_str())
            .unwrap_or(IMDS_DEFAULT_ENDPOINT);

        let mut url =
            format!("{endpoint}?api-version=2018-02-01&resource={KEY_VAULT_RESOURCE}");

        // At most one identity selector applies.
        if let Some(object_id) = envs.get(AZURE_OBJECT_ID).filter(|s| !s.is_empty()) {
            url.push_str(&format!("&object_id={object_id}"));
        } else if let Some(client_id) = envs.get(AZURE_CLIENT_ID).filter(|s| !s.is_empty()) {
            url.push_str(&format!("&client_id={client_id}"));
        } else if let Some(msi_res_id) = envs.get(AZURE_MSI_RES_ID).filter(|s| !s.is_empty()) {
            url.push_str(&format!("&msi_res_id={msi_res_id}"));
        }

        let mut req = http::Request::builder()
            .method(http::Method::GET)
            .uri(&url)
            .header("Metadata", "true");

        if let Some(msi_secret) = envs.get(AZURE_MSI_SECRET).filter(|s| !s.is_empty()) {
            req = req.header("X-IDENTITY-HEADER", msi_secret);
        }

        let req = req.body(bytes::Bytes::new()).map_err(|e| {
            Error::vault_auth_denied("failed to build IMDS request").with_source(e)
        })?;

        let resp = ctx.http_send(req).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::vault_auth_denied(format!(
                "IMDS request failed with status {status}"
            )));
        }

        let token: AccessTokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::vault_auth_denied("failed to parse IMDS response").with_source(e)
        })?;

        // IMDS reports expiry as a unix timestamp in a string field.
        let expires_on = if token.expires_on.is_empty() {
            time::now() + chrono::TimeDelta::try_minutes(10).expect("in bounds")
        } else {
            let secs = token.expires_on.parse::<i64>().map_err(|e| {
                Error::vault_auth_denied("failed to parse IMDS token expiry").with_source(e)
            })?;
            chrono::DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| Error::vault_auth_denied("IMDS token expiry out of range"))?
        };

        Ok(Some(BearerToken::new(&token.access_token, Some(expires_on))))
    }
}

#[derive(serde::Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: String,
}
