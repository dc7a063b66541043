//! Core components for issuing scoped storage delegation tokens.
//!
//! This crate provides the foundation shared by every blobgate crate:
//!
//! - **Context**: a container holding the HTTP sending, file reading and
//!   environment access capabilities a provider may need. Unconfigured
//!   components fall back to no-op implementations.
//! - **Capability traits**: [`ProvideSecret`] for fetching a stored
//!   connection secret from a vault, and [`ProvideBearerToken`] for
//!   obtaining the ambient identity used to authenticate to that vault.
//! - **Error taxonomy**: a closed set of failure kinds ([`ErrorKind`]) so
//!   the HTTP boundary can map every failure to a status exhaustively.
//!
//! No crate in the workspace performs I/O except through [`Context`], which
//! keeps every stage testable with static environments and canned HTTP
//! responses.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, FileRead, HttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{
    BearerToken, ProvideBearerToken, ProvideBearerTokenChain, ProvideSecret, RawSecret,
};
