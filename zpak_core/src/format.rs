//! The zpak archive format: a self-describing manifest followed by a
//! contiguous file-data region, the whole of which is compressed.
//!
//! ```text
//! offset 0       : u64 LE  manifest_size
//! offset 8       : manifest_size bytes  manifest payload (serializer-encoded)
//! offset 8+ms    : rest of file         file-data region (uncompressed concatenation)
//! ```
//! That whole buffer is then compressed by one codec; there is no outer
//! envelope and no magic number at the file level.

/// Current (and only) manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

// ── Codec id assignments — part of the wire format, never renumber ────────
pub const CODEC_LZ4: u8 = 1;
pub const CODEC_ZSTD: u8 = 2;
pub const CODEC_LZMA: u8 = 3;
pub const CODEC_BROTLI: u8 = 4;

/// One record in the manifest describing a single packed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Relative, forward-slash path as it existed under the input root.
    pub original_path: String,
    /// Locator of this entry's bytes in the data region: `"offset:<decimal>"`.
    pub encoded_path: String,
    pub original_size: u64,
    /// Equal to `original_size` in this format version; kept distinct so a
    /// future per-entry transform can diverge without a format change.
    pub encoded_size: u64,
    /// CRC-32 (IEEE) of the raw file bytes.
    pub checksum: u32,
}

impl ManifestEntry {
    /// Parse the decimal offset out of `encoded_path`.
    pub fn offset(&self) -> crate::error::Result<u64> {
        self.encoded_path
            .strip_prefix("offset:")
            .ok_or_else(|| {
                crate::error::Error::CorruptedData(format!(
                    "encoded_path {:?} is not of the form 'offset:<decimal>'",
                    self.encoded_path
                ))
            })?
            .parse::<u64>()
            .map_err(|e| {
                crate::error::Error::CorruptedData(format!(
                    "encoded_path {:?} has a non-decimal offset: {e}",
                    self.encoded_path
                ))
            })
    }
}

/// The index written at the head of a serialized archive, before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version: u32,
    pub entries: Vec<ManifestEntry>,
    /// Codec used to compress the outer payload. Always set by this
    /// implementation when writing; `None` only appears when reading a
    /// legacy archive produced by tooling that omitted the field.
    pub algorithm_id: Option<u8>,
}

impl Manifest {
    pub fn new(algorithm_id: u8) -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: Vec::new(),
            algorithm_id: Some(algorithm_id),
        }
    }
}

/// Validate a relative path the way both `Archive::add_file` (building) and
/// `Archive::parse` (reading untrusted input) require: non-empty, not
/// absolute, no `..` component, forward-slash separated.
pub fn validate_relative_path(path: &str) -> crate::error::Result<()> {
    if path.is_empty() {
        return Err(crate::error::Error::CorruptedData(
            "original_path is empty".to_string(),
        ));
    }
    if path.starts_with('/') {
        return Err(crate::error::Error::CorruptedData(format!(
            "original_path {path:?} is absolute"
        )));
    }
    if path.split('/').any(|component| component == "..") {
        return Err(crate::error::Error::CorruptedData(format!(
            "original_path {path:?} contains a '..' component"
        )));
    }
    Ok(())
}
