use serde::{Deserialize, Serialize};

/// Metadata of a remote object, obtained without reading its content.
///
/// `size` is authoritative: sequential iteration over the same object yields
/// exactly `size` bytes in total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttributes {
    /// Object size in bytes.
    pub size: u64,

    /// Checksum algorithm reported by the server (e.g. `xxhash`, `md5`).
    pub checksum_type: Option<String>,

    /// Checksum value in the server's encoding.
    pub checksum_value: Option<String>,

    /// Object version, if the backend is versioned.
    pub version: Option<String>,

    pub etag: Option<String>,
}

impl ObjectAttributes {
    pub fn new(size: u64) -> Self {
        Self { size, ..Self::default() }
    }

    #[must_use]
    pub fn with_checksum(mut self, checksum_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.checksum_type = Some(checksum_type.into());
        self.checksum_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Number of chunks sequential iteration from `offset` yields.
    pub fn chunk_count(&self, chunk_size: usize, offset: u64) -> u64 {
        let remaining = self.size.saturating_sub(offset);
        remaining.div_ceil(chunk_size.max(1) as u64)
    }
}
