mod brotli_codec;
mod lz4_codec;
mod lzma_codec;
mod zstd_codec;

pub use brotli_codec::BrotliCodec;
pub use lz4_codec::Lz4Codec;
pub use lzma_codec::LzmaCodec;
pub use zstd_codec::ZstdCodec;

use std::sync::Arc;

use zpak_core::codec::Codec;
use zpak_core::error::{Error, Result};

/// The set of codecs an `Encoder`/`Decoder` knows about, in a fixed order
/// used both for content-sniffing and as the trial-decompression fallback.
///
/// Detection order is Zstd, LZMA, LZ4, Brotli: Zstd and (eventually) LZMA
/// have real magic bytes to check first; LZ4 and Brotli never match by
/// content and always fall through to trial decompression.
pub struct Registry {
    codecs: Vec<Arc<dyn Codec>>,
}

impl Registry {
    /// Build the registry with every bundled codec.
    pub fn with_defaults() -> Self {
        Self {
            codecs: vec![
                Arc::new(ZstdCodec) as Arc<dyn Codec>,
                Arc::new(LzmaCodec) as Arc<dyn Codec>,
                Arc::new(Lz4Codec) as Arc<dyn Codec>,
                Arc::new(BrotliCodec) as Arc<dyn Codec>,
            ],
        }
    }

    /// All registered codecs, in detection order.
    pub fn all(&self) -> &[Arc<dyn Codec>] {
        &self.codecs
    }

    /// Resolve a codec by its on-disk `algorithm_id`.
    pub fn by_id(&self, id: u8) -> Result<Arc<dyn Codec>> {
        self.codecs
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or_else(|| Error::AlgorithmNotFound(format!("algorithm id {id}")))
    }

    /// Resolve a codec by its CLI-facing name (e.g. `"zstd"`), case-sensitive.
    pub fn by_name(&self, name: &str) -> Result<Arc<dyn Codec>> {
        self.codecs
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| Error::AlgorithmNotFound(name.to_string()))
    }

    /// First codec whose `detect` recognizes `bytes`, if any.
    pub fn detect(&self, bytes: &[u8]) -> Option<Arc<dyn Codec>> {
        self.codecs.iter().find(|c| c.detect(bytes)).cloned()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
