//! Azure implementation of the blobgate issuance pipeline.
//!
//! This crate covers the three Azure-facing stages:
//!
//! - fetching the stored connection secret from Key Vault, authenticating
//!   with an ambient identity ([`VaultSecretProvider`]);
//! - validating the connection string into an [`AccountCredential`]
//!   ([`connection_string::parse`]);
//! - deriving a container-scoped shared access signature under an
//!   [`AccessPolicy`] ([`sas::issue`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use blobgate_azure::provide_token::DefaultTokenProvider;
//! use blobgate_azure::sas;
//! use blobgate_azure::{connection_string, AccessPolicy, VaultSecretProvider};
//! use blobgate_core::{Context, ProvideSecret};
//!
//! # async fn example(ctx: Context) -> blobgate_core::Result<()> {
//! let vault = VaultSecretProvider::new(
//!     "https://example-vault.vault.azure.net",
//!     "storageConnectionString",
//!     DefaultTokenProvider::new(),
//! );
//!
//! let secret = vault.provide_secret(&ctx).await?;
//! let credential = connection_string::parse(&secret)?;
//! let policy = AccessPolicy::ad_hoc_default(blobgate_core::time::now());
//! let issued = sas::issue(&credential, "images", &policy)?;
//! println!("{} -> {}", issued.container_uri, issued.sas_token);
//! # Ok(())
//! # }
//! ```

mod constants;

pub mod connection_string;

mod credential;
pub use credential::AccountCredential;

mod policy;
pub use policy::{AccessPolicy, Permissions};

pub mod sas;
pub use sas::IssuedToken;

mod vault;
pub use vault::VaultSecretProvider;

pub mod provide_token;
