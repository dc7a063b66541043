//! Ambient identity sources for vault authentication.
//!
//! Each provider yields a bearer token for the Key Vault audience, or `None`
//! when its inputs are absent from the environment. [`DefaultTokenProvider`]
//! chains them the way the process would be deployed: explicit service
//! principal first, then workload identity, then the VM's metadata service.

mod static_provider;
pub use static_provider::StaticTokenProvider;

mod client_secret;
pub use client_secret::ClientSecretTokenProvider;

mod workload_identity;
pub use workload_identity::WorkloadIdentityTokenProvider;

mod imds;
pub use imds::ImdsTokenProvider;

mod default;
pub use default::DefaultTokenProvider;
