//! Container-scoped shared access signature derivation.
//!
//! A service SAS for a blob container is an HMAC-SHA256 over a fixed,
//! newline-joined field list, rendered as URL query parameters. The token is
//! derived freshly on every call and never cached; since the policy's
//! implicit start time is the issuance instant, two issuances at different
//! times produce different tokens for the same resource.
//!
//! Reference: <https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas>

use blobgate_core::hash::{base64_decode, base64_hmac_sha256};
use blobgate_core::time::{format_rfc3339, now};
use blobgate_core::Result;

use crate::{AccessPolicy, AccountCredential};

/// The SAS version signed into every token.
const SAS_VERSION: &str = "2020-12-06";
/// Signed resource marker for a container-scoped token.
const SAS_RESOURCE_CONTAINER: &str = "c";

/// The result of token issuance: the container URI and the delegation token
/// to append to it. An immutable value handed to the caller; nothing is
/// stored server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// URI of the container the token is scoped to.
    pub container_uri: String,
    /// The signed token in query-string form, e.g. `sv=...&sr=c&...&sig=...`.
    pub sas_token: String,
}

/// Derive a container SAS for `container` under `credential`, constrained by
/// `policy`.
pub fn issue(
    credential: &AccountCredential,
    container: &str,
    policy: &AccessPolicy,
) -> Result<IssuedToken> {
    ContainerSharedAccessSignature::new(credential, container, policy.clone())?.issue()
}

/// Signer for one container SAS.
pub struct ContainerSharedAccessSignature {
    account_name: String,
    account_key: String,
    container: String,
    container_uri: String,
    policy: AccessPolicy,
    version: String,
}

impl ContainerSharedAccessSignature {
    /// Create a signer for the given container resource.
    ///
    /// Fails with `ContainerNotAccessible` when the container cannot be
    /// resolved under the credential.
    pub fn new(
        credential: &AccountCredential,
        container: &str,
        policy: AccessPolicy,
    ) -> Result<Self> {
        let container_uri = credential.container_url(container)?;

        Ok(Self {
            account_name: credential.account_name.clone(),
            account_key: credential.account_key.clone(),
            container: container.to_string(),
            container_uri,
            policy,
            version: SAS_VERSION.to_string(),
        })
    }

    /// Construct the string-to-sign.
    ///
    /// Field order for version 2020-12-06: permissions, start, expiry,
    /// canonicalized resource, identifier, ip, protocol, version, resource,
    /// snapshot time, encryption scope, then the five response-header
    /// overrides. Ad-hoc constraints and a stored policy identifier are
    /// mutually exclusive; exactly one side of the match fills its slots.
    fn string_to_sign(&self) -> String {
        let canonicalized_resource =
            format!("/blob/{}/{}", self.account_name, self.container);

        let (permissions, expiry, identifier) = match &self.policy {
            AccessPolicy::AdHoc {
                expiry,
                permissions,
            } => (
                permissions.to_signed_string(),
                format_rfc3339(*expiry),
                String::new(),
            ),
            AccessPolicy::Stored { name } => (String::new(), String::new(), name.clone()),
        };

        [
            permissions,
            String::new(), // start: omitted, validity begins on receipt
            expiry,
            canonicalized_resource,
            identifier,
            String::new(), // ip range
            String::new(), // protocol
            self.version.clone(),
            SAS_RESOURCE_CONTAINER.to_string(),
            String::new(), // snapshot time
            String::new(), // encryption scope
            String::new(), // rscc
            String::new(), // rscd
            String::new(), // rsce
            String::new(), // rscl
            String::new(), // rsct
        ]
        .join("\n")
    }

    /// Compute the signature over the string-to-sign.
    ///
    /// Fails with `SigningFailure` when the account key is not valid base64.
    fn signature(&self) -> Result<String> {
        let decoded_key = base64_decode(&self.account_key)?;
        Ok(base64_hmac_sha256(
            &decoded_key,
            self.string_to_sign().as_bytes(),
        ))
    }

    /// Produce the token as ordered query parameters.
    pub fn token(&self) -> Result<Vec<(String, String)>> {
        let mut elements: Vec<(String, String)> = vec![
            ("sv".to_string(), self.version.clone()),
            ("sr".to_string(), SAS_RESOURCE_CONTAINER.to_string()),
        ];

        match &self.policy {
            AccessPolicy::AdHoc {
                expiry,
                permissions,
            } => {
                elements.push(("se".to_string(), urlencoded(format_rfc3339(*expiry))));
                elements.push(("sp".to_string(), permissions.to_signed_string()));
            }
            AccessPolicy::Stored { name } => {
                elements.push(("si".to_string(), urlencoded(name.clone())));
            }
        }

        elements.push(("sig".to_string(), urlencoded(self.signature()?)));

        Ok(elements)
    }

    /// Produce the finished `IssuedToken`.
    pub fn issue(&self) -> Result<IssuedToken> {
        let sas_token = self
            .token()?
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<String>>()
            .join("&");

        Ok(IssuedToken {
            container_uri: self.container_uri.clone(),
            sas_token,
        })
    }
}

fn urlencoded(s: String) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
