//! Key generation and validation shared by the blob backends.

use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::BlobError;
use crate::types::BlobMetadata;

/// Replace anything outside `[A-Za-z0-9._-]` with `_`, dropping any
/// directory components the client sent along.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned
    }
}

/// Reject keys that are empty, absolute, or contain `.`/`..` segments.
///
/// # Errors
///
/// Returns [`BlobError::InvalidKey`] if the key is unsafe to map onto a path.
pub fn validate(key: &str) -> Result<(), BlobError> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') || key.contains('\0') {
        return Err(BlobError::InvalidKey(key.to_owned()));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(BlobError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// Build a fresh key of the form `{namespace}/{uuid}_{filename}`.
///
/// # Errors
///
/// Returns [`BlobError::InvalidKey`] if `namespace` is not a valid key prefix.
pub fn generate(namespace: &str, filename: &str) -> Result<String, BlobError> {
    let namespace = namespace.trim_matches('/');
    validate(namespace)?;
    Ok(format!(
        "{namespace}/{}_{}",
        uuid::Uuid::now_v7().simple(),
        sanitize_filename(filename)
    ))
}

#[must_use]
pub fn checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Check `data` against an optional size limit.
///
/// # Errors
///
/// Returns [`BlobError::TooLarge`] when `data` exceeds `limit`.
pub fn check_size(data: &Bytes, limit: Option<u64>) -> Result<(), BlobError> {
    let size = data.len() as u64;
    match limit {
        Some(limit) if size > limit => Err(BlobError::TooLarge { size, limit }),
        _ => Ok(()),
    }
}

pub(crate) fn metadata(key: String, filename: &str, content_type: &str, data: &Bytes) -> BlobMetadata {
    BlobMetadata {
        key,
        filename: filename.to_owned(),
        content_type: content_type.to_owned(),
        size_bytes: data.len() as u64,
        checksum_sha256: checksum(data),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\sig.png"), "sig.png");
        assert_eq!(sanitize_filename("my signature (1).png"), "my_signature__1_.png");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn validate_rejects_traversal() {
        assert!(validate("signatures/a.png").is_ok());
        assert!(validate("documents/with_signatures/x.pdf").is_ok());
        for bad in ["", "/etc/passwd", "a/../b", "./a", "a//b", "a\\b", "a/"] {
            assert!(
                matches!(validate(bad), Err(BlobError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn generated_keys_are_unique_and_namespaced() {
        let a = generate("signatures", "sig.png").unwrap();
        let b = generate("/signatures/", "sig.png").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("signatures/"));
        assert!(a.ends_with("_sig.png"));
        assert!(validate(&a).is_ok());
        assert!(generate("..", "x").is_err());
    }

    #[test]
    fn checksum_is_sha256_hex() {
        assert_eq!(
            checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn size_limit() {
        let data = Bytes::from_static(b"12345");
        assert!(check_size(&data, None).is_ok());
        assert!(check_size(&data, Some(5)).is_ok());
        assert!(matches!(
            check_size(&data, Some(4)),
            Err(BlobError::TooLarge { size: 5, limit: 4 })
        ));
    }
}
