use crate::time::{now, DateTime};
use crate::utils::Redact;
use crate::{Context, Result};
use std::fmt::{self, Debug, Formatter};

/// An opaque secret value fetched from a vault.
///
/// The content is never logged in full: `Debug` renders a redacted form.
/// Use [`RawSecret::expose`] only at the point of consumption.
#[derive(Clone)]
pub struct RawSecret(String);

impl RawSecret {
    /// Wrap a secret value retrieved from the vault.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the secret content for immediate use.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for RawSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawSecret")
            .field(&Redact::from(&self.0))
            .finish()
    }
}

/// A bearer token obtained from an ambient identity source.
#[derive(Clone)]
pub struct BearerToken {
    /// The access token value.
    pub token: String,
    /// Expiration time for this token, if known.
    pub expires_on: Option<DateTime>,
}

impl BearerToken {
    /// Create a new bearer token.
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Check if the token is non-empty and not about to expire.
    pub fn is_valid(&self) -> bool {
        if self.token.is_empty() {
            return false;
        }
        // Take 20s as buffer to avoid expiring mid-request.
        match self.expires_on {
            Some(expires) => {
                expires > now() + chrono::TimeDelta::try_seconds(20).expect("in bounds")
            }
            None => true,
        }
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &Redact::from(&self.token))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// ProvideBearerToken is the ambient identity capability: it obtains a
/// bearer credential for a fixed resource without any secret embedded in
/// code or configuration.
///
/// Returning `Ok(None)` means this source is not configured in the current
/// environment; a chain moves on to the next source.
#[async_trait::async_trait]
pub trait ProvideBearerToken: Debug + Send + Sync + 'static {
    /// Obtain a bearer token, or `None` if this source does not apply.
    async fn provide_token(&self, ctx: &Context) -> Result<Option<BearerToken>>;
}

/// A chain of bearer token providers that will be tried in order.
///
/// The first provider that yields a token wins. Provider errors are logged
/// and skipped so a misconfigured source does not mask a working one.
pub struct ProvideBearerTokenChain {
    providers: Vec<Box<dyn ProvideBearerToken>>,
}

impl ProvideBearerTokenChain {
    /// Create a new empty provider chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a token provider to the chain.
    pub fn push(mut self, provider: impl ProvideBearerToken + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl Default for ProvideBearerTokenChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ProvideBearerTokenChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideBearerTokenChain")
            .field("providers_count", &self.providers.len())
            .finish()
    }
}

#[async_trait::async_trait]
impl ProvideBearerToken for ProvideBearerTokenChain {
    async fn provide_token(&self, ctx: &Context) -> Result<Option<BearerToken>> {
        for provider in &self.providers {
            log::debug!("trying token provider: {provider:?}");

            match provider.provide_token(ctx).await {
                Ok(Some(token)) => {
                    log::debug!("loaded bearer token from provider: {provider:?}");
                    return Ok(Some(token));
                }
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("token provider {provider:?} failed: {e:?}");
                    continue;
                }
            }
        }

        Ok(None)
    }
}

/// ProvideSecret is the vault capability: fetch the named connection secret.
///
/// One attempt per call; retries belong to the caller's infrastructure, not
/// here. Implementations map their transport and protocol failures onto the
/// vault access error kinds.
#[async_trait::async_trait]
pub trait ProvideSecret: Debug + Send + Sync + 'static {
    /// Fetch the secret value.
    async fn provide_secret(&self, ctx: &Context) -> Result<RawSecret>;
}
