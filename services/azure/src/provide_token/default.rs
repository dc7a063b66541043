use async_trait::async_trait;
use blobgate_core::{
    BearerToken, Context, ProvideBearerToken, ProvideBearerTokenChain, Result,
};

use crate::provide_token::{
    ClientSecretTokenProvider, ImdsTokenProvider, WorkloadIdentityTokenProvider,
};

/// Default ambient identity chain, tried in order:
///
/// 1. Client secret (explicit service principal in the environment)
/// 2. Workload identity (federated token file)
/// 3. IMDS (managed identity on Azure compute)
#[derive(Debug)]
pub struct DefaultTokenProvider {
    chain: ProvideBearerTokenChain,
}

impl Default for DefaultTokenProvider {
    fn default() -> Self {
        let chain = ProvideBearerTokenChain::new()
            .push(ClientSecretTokenProvider::new())
            .push(WorkloadIdentityTokenProvider::new())
            .push(ImdsTokenProvider::new());

        Self { chain }
    }
}

impl DefaultTokenProvider {
    /// Create the default provider chain.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProvideBearerToken for DefaultTokenProvider {
    async fn provide_token(&self, ctx: &Context) -> Result<Option<BearerToken>> {
        self.chain.provide_token(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use blobgate_core::{HttpSend, StaticEnv};
    use bytes::Bytes;
    use std::collections::HashMap;

    #[derive(Debug)]
    struct AnyTokenEndpoint;

    #[async_trait]
    impl HttpSend for AnyTokenEndpoint {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            // The service principal path POSTs to the authority; IMDS GETs
            // the metadata endpoint. Either way a token comes back.
            let token = if req.method() == http::Method::POST {
                br#"{"access_token":"spn","expires_in":3600}"#.as_slice()
            } else {
                br#"{"access_token":"imds"}"#.as_slice()
            };
            Ok(http::Response::builder()
                .status(http::StatusCode::OK)
                .body(Bytes::copy_from_slice(token))
                .unwrap())
        }
    }

    #[tokio::test]
    async fn test_prefers_service_principal_over_imds() {
        let envs = HashMap::from([
            (AZURE_TENANT_ID.to_string(), "tenant".to_string()),
            (AZURE_CLIENT_ID.to_string(), "client".to_string()),
            (AZURE_CLIENT_SECRET.to_string(), "secret".to_string()),
        ]);
        let ctx = Context::new()
            .with_env(StaticEnv { envs })
            .with_http_send(AnyTokenEndpoint);

        let token = DefaultTokenProvider::new()
            .provide_token(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.token, "spn");
    }

    #[tokio::test]
    async fn test_falls_back_to_imds() {
        let ctx = Context::new()
            .with_env(StaticEnv {
                envs: HashMap::new(),
            })
            .with_http_send(AnyTokenEndpoint);

        let token = DefaultTokenProvider::new()
            .provide_token(&ctx)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.token, "imds");
    }
}
