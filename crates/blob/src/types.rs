use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    /// Storage key, a relative `/`-separated path (e.g. `"signatures/0190…_sig.png"`).
    pub key: String,
    /// Original filename.
    pub filename: String,
    /// MIME content type (e.g. `"image/png"`).
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// `SHA-256` hex digest of the blob content.
    pub checksum_sha256: String,
    pub created_at: DateTime<Utc>,
}

/// A fully resolved blob: metadata plus the binary content.
#[derive(Debug, Clone)]
pub struct ResolvedBlob {
    pub metadata: BlobMetadata,
    pub data: bytes::Bytes,
}
