//! Hash related utils.

use crate::{Error, ErrorKind};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::new(ErrorKind::SigningFailure, "base64 decode failed").with_source(e))
}

/// Base64 encoded HMAC-SHA256 hash.
pub fn base64_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    let mut h = Hmac::<Sha256>::new_from_slice(key).expect("HMAC takes key of any size");
    h.update(content);
    base64_encode(&h.finalize().into_bytes())
}
