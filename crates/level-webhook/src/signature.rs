// Level webhook signatures.
//
// Level signs each delivery with `x-level-signature: sha256=<hex>`, the
// lowercase hex HMAC-SHA256 of the raw request body keyed by the shared
// webhook secret. The HMAC always runs over the bytes as received.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-level-signature";

/// Scheme prefix on the header value.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Why a delivery failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Missing or invalid Level signature header.")]
    MissingHeader,
    #[error("Invalid Level webhook signature.")]
    Mismatch,
    #[error("webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// Compute the header value for `raw_body`: `sha256=<lowercase hex>`.
pub fn sign(secret: &str, raw_body: &[u8]) -> Result<String, SignatureError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(raw_body);
    let digest = mac.finalize().into_bytes();
    Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(digest)))
}

/// Constant-time string comparison.
///
/// A length mismatch returns early; equal lengths always scan every byte.
pub fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut out = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        out |= x ^ y;
    }
    out == 0
}

/// Check a delivery, reporting which rule failed.
///
/// No secret (or an empty one) disables verification.
pub fn check(
    secret: Option<&str>,
    raw_body: &[u8],
    header: Option<&str>,
) -> Result<(), SignatureError> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let provided = header
        .filter(|h| h.starts_with(SIGNATURE_PREFIX))
        .ok_or(SignatureError::MissingHeader)?;

    let expected = sign(secret, raw_body)?;
    if timing_safe_eq(&expected, provided) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// `true` when the delivery passes [`check`].
pub fn verify(secret: Option<&str>, raw_body: &[u8], header: Option<&str>) -> bool {
    check(secret, raw_body, header).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"x":1}"#;

    #[test]
    fn correct_signature_passes() {
        let header = sign("abc", BODY).unwrap();
        assert!(header.starts_with("sha256="));
        assert_eq!(header.len(), SIGNATURE_PREFIX.len() + 64);
        assert!(verify(Some("abc"), BODY, Some(&header)));
    }

    #[test]
    fn any_flipped_hex_char_fails() {
        let header = sign("abc", BODY).unwrap();
        for pos in SIGNATURE_PREFIX.len()..header.len() {
            let mut bytes = header.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert_eq!(
                check(Some("abc"), BODY, Some(&tampered)),
                Err(SignatureError::Mismatch),
                "position {pos}"
            );
        }
    }

    #[test]
    fn missing_or_unprefixed_header_fails() {
        let header = sign("abc", BODY).unwrap();
        let bare = header.trim_start_matches(SIGNATURE_PREFIX);

        assert_eq!(check(Some("abc"), BODY, None), Err(SignatureError::MissingHeader));
        assert_eq!(check(Some("abc"), BODY, Some(bare)), Err(SignatureError::MissingHeader));
        assert_eq!(
            check(Some("abc"), BODY, Some("sha256=")),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn no_secret_always_passes() {
        assert!(verify(None, BODY, None));
        assert!(verify(Some(""), BODY, Some("garbage")));
    }

    #[test]
    fn signature_covers_raw_bytes() {
        let header = sign("abc", BODY).unwrap();
        assert!(!verify(Some("abc"), br#"{ "x": 1 }"#, Some(&header)));
        assert!(!verify(Some("abd"), BODY, Some(&header)));
    }

    #[test]
    fn timing_safe_eq_rules() {
        assert!(timing_safe_eq("", ""));
        assert!(timing_safe_eq("abc", "abc"));
        assert!(!timing_safe_eq("abc", "abd"));
        assert!(!timing_safe_eq("abc", "abcd"));
    }
}
