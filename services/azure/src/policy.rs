use blobgate_core::time::DateTime;

/// How long an ad-hoc token stays valid: one hour from issuance.
pub fn default_expiry() -> chrono::TimeDelta {
    chrono::TimeDelta::try_hours(1).expect("in bounds")
}

/// Permission set carried by an ad-hoc access policy.
///
/// Rendered in the platform's fixed order, so `{read, write, list}` always
/// signs as `rwl` regardless of construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    /// Allow reading blobs in the container.
    pub read: bool,
    /// Allow writing blobs in the container.
    pub write: bool,
    /// Allow listing the container's contents.
    pub list: bool,
}

impl Permissions {
    /// Read, write and list.
    pub fn read_write_list() -> Self {
        Self {
            read: true,
            write: true,
            list: true,
        }
    }

    /// The `sp` field value in its canonical order.
    pub fn to_signed_string(self) -> String {
        let mut s = String::with_capacity(3);
        if self.read {
            s.push('r');
        }
        if self.write {
            s.push('w');
        }
        if self.list {
            s.push('l');
        }
        s
    }
}

/// Access constraints for an issued token.
///
/// The two shapes are mutually exclusive by construction: an ad-hoc policy
/// embeds its expiry and permissions directly in the signature, while a
/// stored policy defers every constraint to the named server-side policy.
/// The signature string must never carry both, which the storage platform
/// would reject as ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Constraints embedded directly in the signed token.
    AdHoc {
        /// Expiry instant signed into the token. No start time is signed:
        /// validity begins on receipt, which sidesteps clock skew between
        /// issuer and storage platform.
        expiry: DateTime,
        /// Permission set signed into the token.
        permissions: Permissions,
    },
    /// Constraints taken from a named stored access policy on the container.
    Stored {
        /// Name of the server-side policy.
        name: String,
    },
}

impl AccessPolicy {
    /// The default issuance policy: expires one hour after `now`, grants
    /// read, write and list.
    pub fn ad_hoc_default(now: DateTime) -> Self {
        AccessPolicy::AdHoc {
            expiry: now + default_expiry(),
            permissions: Permissions::read_write_list(),
        }
    }

    /// A policy deferring to the named stored access policy.
    pub fn stored(name: impl Into<String>) -> Self {
        AccessPolicy::Stored { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobgate_core::time::parse_rfc3339;

    #[test]
    fn test_permissions_render_in_canonical_order() {
        assert_eq!(Permissions::read_write_list().to_signed_string(), "rwl");
        assert_eq!(
            Permissions {
                read: false,
                write: true,
                list: true
            }
            .to_signed_string(),
            "wl"
        );
        assert_eq!(Permissions::default().to_signed_string(), "");
    }

    #[test]
    fn test_default_policy_is_one_hour() {
        let now = parse_rfc3339("2022-03-01T08:12:34Z").unwrap();
        match AccessPolicy::ad_hoc_default(now) {
            AccessPolicy::AdHoc {
                expiry,
                permissions,
            } => {
                assert_eq!(expiry, parse_rfc3339("2022-03-01T09:12:34Z").unwrap());
                assert_eq!(permissions, Permissions::read_write_list());
            }
            AccessPolicy::Stored { .. } => panic!("expected an ad-hoc policy"),
        }
    }
}
