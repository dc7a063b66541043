// Ambient identity environment, shared across the token providers.
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub const AZURE_FEDERATED_TOKEN_FILE: &str = "AZURE_FEDERATED_TOKEN_FILE";
pub const AZURE_OBJECT_ID: &str = "AZURE_OBJECT_ID";
pub const AZURE_MSI_RES_ID: &str = "AZURE_MSI_RES_ID";
pub const AZURE_MSI_SECRET: &str = "AZURE_MSI_SECRET";
pub const AZURE_IMDS_ENDPOINT: &str = "AZURE_IMDS_ENDPOINT";

pub const AZURE_PUBLIC_CLOUD: &str = "https://login.microsoftonline.com";
pub const IMDS_DEFAULT_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// Audience the vault bearer token is requested for.
pub const KEY_VAULT_RESOURCE: &str = "https://vault.azure.net";
/// OAuth scope form of [`KEY_VAULT_RESOURCE`].
pub const KEY_VAULT_SCOPE: &str = "https://vault.azure.net/.default";
/// Key Vault REST API version used for secret retrieval.
pub const KEY_VAULT_API_VERSION: &str = "7.4";
