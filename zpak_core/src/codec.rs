use crate::error::Result;

/// Three-point compression level, mapped to each codec's native quality knob
/// per the table in the codec implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Default for Level {
    fn default() -> Self {
        Level::Medium
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "medium" => Ok(Level::Medium),
            "high" => Ok(Level::High),
            other => Err(format!("unknown level '{other}'; expected low, medium, or high")),
        }
    }
}

/// Core compression abstraction shared by every bundled codec.
///
/// Each implementation compresses/decompresses a whole archive payload in one
/// shot — the container has no internal block structure, so there is no
/// per-block state to keep independent (unlike a random-access format).
/// Implementations must be stateless between calls: a streaming codec (LZMA,
/// Brotli) builds a fresh encoder/decoder context inside `compress`/
/// `decompress` rather than holding one across calls.
pub trait Codec: Send + Sync {
    /// Stable numeric id stored in the manifest's `algorithm_id` field.
    fn id(&self) -> u8;

    /// Human-readable, case-sensitive name used for CLI `--algo` lookup.
    fn name(&self) -> &'static str;

    /// Compress the whole payload at the given level.
    fn compress(&self, input: &[u8], level: Level) -> Result<Vec<u8>>;

    /// Decompress a payload produced by `compress`.
    ///
    /// `hint_original_size`, when known, lets non-streaming codecs allocate
    /// the output buffer once instead of growing it.
    fn decompress(&self, input: &[u8], hint_original_size: Option<u64>) -> Result<Vec<u8>>;

    /// Upper bound on the compressed size of an input of `input_len` bytes.
    fn bound(&self, input_len: usize) -> usize;

    /// Best-effort positive identification of this codec's own frame.
    ///
    /// Must be conservative: codecs without reliable magic bytes (LZ4 raw
    /// blocks, Brotli) always return `false` here rather than guessing.
    fn detect(&self, bytes: &[u8]) -> bool;
}
