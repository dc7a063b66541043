//! Validation of storage connection strings.
//!
//! The secret stored in the vault is an [Azure connection string][1]:
//! `;`-separated `Key=Value` fields such as
//!
//! ```txt
//! DefaultEndpointsProtocol=https;
//! AccountName=mystorageaccount;
//! AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
//! EndpointSuffix=core.windows.net
//! ```
//!
//! Parsing is pure and deterministic. Error messages name the structural
//! problem only and never include the secret content, which may hold the
//! account key.
//!
//! [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string

use std::collections::HashMap;

use blobgate_core::{Error, RawSecret, Result};

use crate::AccountCredential;

/// Parse and validate a raw connection secret into an [`AccountCredential`].
///
/// Required fields: `AccountName`, `AccountKey`, `EndpointSuffix`.
/// `DefaultEndpointsProtocol` defaults to `https`; only `http` and `https`
/// are accepted. A missing or empty required field fails with
/// `MalformedCredential` and no partially populated credential escapes.
pub fn parse(raw: &RawSecret) -> Result<AccountCredential> {
    let key_values = parse_into_key_values(raw.expose())?;

    let account_name = require(&key_values, "AccountName")?;
    let account_key = require(&key_values, "AccountKey")?;
    let endpoint_suffix = require(&key_values, "EndpointSuffix")?;

    let scheme = match key_values.get("DefaultEndpointsProtocol").map(String::as_str) {
        None => "https".to_string(),
        Some("https") => "https".to_string(),
        Some("http") => "http".to_string(),
        Some(_) => {
            return Err(Error::malformed_credential(
                "connection string field DefaultEndpointsProtocol must be http or https",
            ))
        }
    };

    Ok(AccountCredential {
        account_name,
        account_key,
        endpoint_suffix,
        scheme,
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.split_once('=').ok_or_else(|| {
                // Field content withheld: it may carry secret material.
                Error::malformed_credential("connection string field is missing '='")
            })?;
            Ok((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

fn require(key_values: &HashMap<String, String>, key: &str) -> Result<String> {
    match key_values.get(key) {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::malformed_credential(format!(
            "connection string is missing required field {key}"
        ))),
    }
}
