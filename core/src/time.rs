//! Time related utils.

use chrono::{SecondsFormat, Utc};

use crate::{Error, ErrorKind};

/// DateTime is the alias of `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a time into the second-precision RFC3339 form the storage platform
/// expects in signed fields: `2022-03-01T08:12:34Z`.
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            Error::new(ErrorKind::VaultAuthDenied, "invalid timestamp in token response")
                .with_source(e)
        })
}
