use async_trait::async_trait;
use blobgate_core::{BearerToken, Context, ProvideBearerToken, Result};

/// A provider that always returns a fixed token.
///
/// Useful for tests and for environments where a token is minted out of
/// band and handed to the process.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider {
    token: BearerToken,
}

impl StaticTokenProvider {
    /// Create a provider around a pre-issued bearer token.
    pub fn new(token: &str) -> Self {
        Self {
            token: BearerToken::new(token, None),
        }
    }
}

#[async_trait]
impl ProvideBearerToken for StaticTokenProvider {
    async fn provide_token(&self, _ctx: &Context) -> Result<Option<BearerToken>> {
        Ok(Some(self.token.clone()))
    }
}
