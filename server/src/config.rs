use anyhow::{bail, Result};
use blobgate_core::Context;

/// Immutable configuration snapshot, built once at startup and passed
/// explicitly into the collaborators. Core logic never reads ambient
/// globals.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URI of the vault holding the connection secret.
    pub vault_uri: String,
    /// Name of the secret holding the storage connection string.
    pub secret_name: String,
    /// Container the issued tokens are scoped to.
    pub container_name: String,
    /// Informational text returned alongside every issued token.
    pub message: String,
    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            vault_uri: String::new(),
            secret_name: "storageConnectionString".to_string(),
            container_name: "images".to_string(),
            message: "Pipeline test.".to_string(),
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load config from the environment.
    ///
    /// `KEY_VAULT_URI` and `STORAGE_CONNECTION` name the vault and the
    /// secret; `SAS_CONTAINER_NAME`, `SAS_RESPONSE_MESSAGE` and
    /// `BLOBGATE_LISTEN` override the defaults.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var("KEY_VAULT_URI") {
            self.vault_uri = v;
        }
        if let Some(v) = ctx.env_var("STORAGE_CONNECTION") {
            self.secret_name = v;
        }
        if let Some(v) = ctx.env_var("SAS_CONTAINER_NAME") {
            self.container_name = v;
        }
        if let Some(v) = ctx.env_var("SAS_RESPONSE_MESSAGE") {
            self.message = v;
        }
        if let Some(v) = ctx.env_var("BLOBGATE_LISTEN") {
            self.listen = v;
        }
        self
    }

    /// Check the snapshot names a vault and a secret.
    pub fn validate(&self) -> Result<()> {
        if self.vault_uri.is_empty() {
            bail!("vault URI is not configured; set KEY_VAULT_URI");
        }
        if self.secret_name.is_empty() {
            bail!("secret name is not configured; set STORAGE_CONNECTION");
        }
        if self.container_name.is_empty() {
            bail!("container name is not configured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::StaticEnv;
    use std::collections::HashMap;

    #[test]
    fn test_from_env() {
        let ctx = Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (
                    "KEY_VAULT_URI".to_string(),
                    "https://example-vault.vault.azure.net".to_string(),
                ),
                ("SAS_CONTAINER_NAME".to_string(), "uploads".to_string()),
            ]),
        });

        let config = ServerConfig::default().from_env(&ctx);
        assert_eq!(config.vault_uri, "https://example-vault.vault.azure.net");
        assert_eq!(config.secret_name, "storageConnectionString");
        assert_eq!(config.container_name, "uploads");
        assert_eq!(config.message, "Pipeline test.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_vault_uri() {
        let config = ServerConfig::default();
        assert!(config.validate().is_err());
    }
}
