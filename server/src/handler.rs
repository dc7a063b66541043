//! The issuance request handler.
//!
//! Each request runs the pipeline stage by stage, terminal at the first
//! error: fetch the secret, validate the connection string, derive the SAS.
//! The single kind-to-status mapping lives here and is exhaustive over the
//! closed error set.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blobgate_azure::{connection_string, sas, AccessPolicy, IssuedToken};
use blobgate_core::{time, Error, ErrorKind, Result};
use serde::Serialize;

use crate::AppState;

/// JSON body returned on success.
#[derive(Debug, Serialize)]
pub struct ResponsePayload {
    /// URI of the container the token is scoped to.
    pub uri: String,
    /// The delegation token to append to the URI.
    pub token: String,
    /// Informational text from configuration.
    pub message: String,
}

/// Handle `GET /api/token`.
pub async fn issue_token(State(state): State<AppState>) -> Response {
    match run(&state).await {
        Ok(issued) => {
            tracing::info!(uri = %issued.container_uri, "issued container sas token");
            let payload = ResponsePayload {
                uri: issued.container_uri,
                token: issued.sas_token,
                message: state.config.message.clone(),
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            tracing::error!(kind = %err.kind(), "token issuance failed: {err}");
            error_response(&err)
        }
    }
}

/// The issuance pipeline. Every entity created here lives for this request
/// only; the credential is dropped as soon as the token is derived.
async fn run(state: &AppState) -> Result<IssuedToken> {
    let raw = state.secrets.provide_secret(&state.ctx).await?;
    tracing::debug!("secret retrieved from vault");

    let credential = connection_string::parse(&raw)?;
    tracing::debug!(account = %credential.account_name, "storage connection string is valid");

    let policy = AccessPolicy::ad_hoc_default(time::now());
    sas::issue(&credential, &state.config.container_name, &policy)
}

/// Map a failure kind to its HTTP outcome.
///
/// Vault access failures surface as 403 so the operator knows the service
/// identity (not the caller's input) is the problem; validation and
/// issuance failures surface as 400. Bodies carry the human-readable
/// summary only, never internals or secret material.
fn error_response(err: &Error) -> Response {
    match err.kind() {
        ErrorKind::VaultUnreachable | ErrorKind::VaultAuthDenied | ErrorKind::SecretNotFound => (
            StatusCode::FORBIDDEN,
            format!("Unable to access secrets in vault: {}", err.message()),
        )
            .into_response(),
        ErrorKind::MalformedCredential => (
            StatusCode::BAD_REQUEST,
            format!(
                "{}. Store a valid storage connection string in the vault secret.",
                err.message()
            ),
        )
            .into_response(),
        ErrorKind::SigningFailure | ErrorKind::ContainerNotAccessible => {
            (StatusCode::BAD_REQUEST, err.message().to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_failures_map_to_forbidden() {
        for err in [
            Error::vault_unreachable("down"),
            Error::vault_auth_denied("denied"),
            Error::secret_not_found("missing"),
        ] {
            assert_eq!(error_response(&err).status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn test_issuance_failures_map_to_bad_request() {
        for err in [
            Error::malformed_credential("missing AccountName"),
            Error::signing_failure("bad key bytes"),
            Error::container_not_accessible("gone"),
        ] {
            assert_eq!(error_response(&err).status(), StatusCode::BAD_REQUEST);
        }
    }
}
