use async_trait::async_trait;
use blobgate_core::{
    Context, Error, ProvideBearerToken, ProvideSecret, RawSecret, Result,
};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::constants::KEY_VAULT_API_VERSION;

/// Fetch a named secret from an Azure Key Vault.
///
/// Authentication is delegated to an injected [`ProvideBearerToken`], so the
/// provider itself holds no credential material: the ambient identity of the
/// process decides whether the vault grants access. One attempt per call,
/// no retry.
///
/// Reference: <https://learn.microsoft.com/en-us/rest/api/keyvault/secrets/get-secret/get-secret>
pub struct VaultSecretProvider {
    vault_uri: String,
    secret_name: String,
    tokens: Arc<dyn ProvideBearerToken>,
}

impl Debug for VaultSecretProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretProvider")
            .field("vault_uri", &self.vault_uri)
            .field("secret_name", &self.secret_name)
            .finish()
    }
}

impl VaultSecretProvider {
    /// Create a provider for one secret in one vault.
    pub fn new(
        vault_uri: impl Into<String>,
        secret_name: impl Into<String>,
        tokens: impl ProvideBearerToken + 'static,
    ) -> Self {
        Self {
            vault_uri: vault_uri.into(),
            secret_name: secret_name.into(),
            tokens: Arc::new(tokens),
        }
    }

    fn secret_url(&self) -> String {
        format!(
            "{}/secrets/{}?api-version={}",
            self.vault_uri.trim_end_matches('/'),
            self.secret_name,
            KEY_VAULT_API_VERSION
        )
    }
}

/// The subset of a Key Vault secret bundle we care about.
#[derive(serde::Deserialize)]
struct SecretBundle {
    value: String,
}

#[async_trait]
impl ProvideSecret for VaultSecretProvider {
    async fn provide_secret(&self, ctx: &Context) -> Result<RawSecret> {
        let token = self
            .tokens
            .provide_token(ctx)
            .await?
            .filter(|t| t.is_valid())
            .ok_or_else(|| {
                Error::vault_auth_denied("no ambient identity available for vault access")
            })?;

        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(self.secret_url())
            .header(http::header::AUTHORIZATION, format!("Bearer {}", token.token))
            .body(bytes::Bytes::new())
            .map_err(|e| {
                Error::vault_unreachable("failed to build vault request").with_source(e)
            })?;

        let resp = ctx.http_send(req).await.map_err(|e| {
            Error::vault_unreachable(format!("vault request failed: {}", e.message()))
                .with_source(e)
        })?;

        match resp.status() {
            status if status.is_success() => {}
            http::StatusCode::UNAUTHORIZED | http::StatusCode::FORBIDDEN => {
                return Err(Error::vault_auth_denied(format!(
                    "identity was rejected by vault {}",
                    self.vault_uri
                )));
            }
            http::StatusCode::NOT_FOUND => {
                return Err(Error::secret_not_found(format!(
                    "vault holds no secret named {}",
                    self.secret_name
                )));
            }
            status => {
                return Err(Error::vault_unreachable(format!(
                    "vault answered with status {status}"
                )));
            }
        }

        let bundle: SecretBundle = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::vault_unreachable("failed to parse vault secret bundle").with_source(e)
        })?;

        log::info!("secret retrieved from vault");
        Ok(RawSecret::new(bundle.value))
    }
}
