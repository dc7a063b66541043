use blobgate_core::utils::Redact;
use blobgate_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// A validated storage account credential parsed from a connection string.
///
/// Created per request from the vault secret and discarded after token
/// issuance; never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredential {
    /// Storage account name.
    pub account_name: String,
    /// Base64 encoded storage account key.
    pub account_key: String,
    /// Endpoint suffix, e.g. `core.windows.net`.
    pub endpoint_suffix: String,
    /// Endpoint scheme, `https` or `http`.
    pub scheme: String,
}

impl Debug for AccountCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl AccountCredential {
    /// Check that every field is populated.
    pub fn is_valid(&self) -> bool {
        !self.account_name.is_empty()
            && !self.account_key.is_empty()
            && !self.endpoint_suffix.is_empty()
            && !self.scheme.is_empty()
    }

    /// The blob service endpoint for this account.
    pub fn blob_endpoint(&self) -> String {
        format!(
            "{}://{}.blob.{}",
            self.scheme, self.account_name, self.endpoint_suffix
        )
    }

    /// Resolve the URI of a named container under this account.
    ///
    /// Fails with `ContainerNotAccessible` when the name cannot name a
    /// container, so the boundary can distinguish it from a generic failure.
    pub fn container_url(&self, container: &str) -> Result<String> {
        validate_container_name(container)?;
        Ok(format!("{}/{}", self.blob_endpoint(), container))
    }
}

/// Container names are 3-63 characters of lowercase letters, digits and
/// single hyphens, starting and ending with a letter or digit.
fn validate_container_name(name: &str) -> Result<()> {
    let valid_length = (3..=63).contains(&name.len());
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    let no_double_hyphen = !name.contains("--");

    if valid_length && valid_chars && valid_edges && no_double_hyphen {
        Ok(())
    } else {
        Err(Error::container_not_accessible(format!(
            "'{name}' is not a valid container name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::ErrorKind;

    fn credential() -> AccountCredential {
        AccountCredential {
            account_name: "testaccount".to_string(),
            account_key: "dGVzdGtleQ==".to_string(),
            endpoint_suffix: "core.windows.net".to_string(),
            scheme: "https".to_string(),
        }
    }

    #[test]
    fn test_container_url() {
        let url = credential().container_url("images").unwrap();
        assert_eq!(url, "https://testaccount.blob.core.windows.net/images");
    }

    #[test]
    fn test_invalid_container_names() {
        for name in ["", "ab", "Images", "images--x", "-images", "images-", "a b"] {
            let err = credential().container_url(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ContainerNotAccessible, "{name}");
        }
    }

    #[test]
    fn test_debug_redacts_account_key() {
        let rendered = format!("{:?}", credential());
        assert!(!rendered.contains("dGVzdGtleQ=="));
        assert!(rendered.contains("testaccount"));
    }
}
