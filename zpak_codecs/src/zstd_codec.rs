use zpak_core::codec::{Codec, Level};
use zpak_core::error::{Error, Result};
use zpak_core::format::CODEC_ZSTD;

/// Magic bytes every Zstandard frame starts with.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

pub struct ZstdCodec;

fn level_to_zstd(level: Level) -> i32 {
    match level {
        Level::Low => 1,
        Level::Medium => 5,
        Level::High => 9,
    }
}

impl Codec for ZstdCodec {
    fn id(&self) -> u8 {
        CODEC_ZSTD
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, input: &[u8], level: Level) -> Result<Vec<u8>> {
        zstd::bulk::compress(input, level_to_zstd(level))
            .map_err(|e| Error::CompressionFailed(format!("zstd: {e}")))
    }

    /// Zstandard frames carry their own content-size header when the encoder
    /// writes one (as `zstd::bulk::compress` does), so `decode_all` already
    /// knows how much to allocate — the hint is ignored.
    fn decompress(&self, input: &[u8], _hint_original_size: Option<u64>) -> Result<Vec<u8>> {
        zstd::decode_all(input).map_err(|e| Error::DecompressionFailed(format!("zstd: {e}")))
    }

    fn bound(&self, input_len: usize) -> usize {
        zstd::zstd_safe::compress_bound(input_len)
    }

    fn detect(&self, bytes: &[u8]) -> bool {
        bytes.len() >= 4 && bytes[..4] == ZSTD_MAGIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let codec = ZstdCodec;
        let data = b"hello hello hello zstd zstd zstd".repeat(50);
        for level in [Level::Low, Level::Medium, Level::High] {
            let compressed = codec.compress(&data, level).unwrap();
            assert!(codec.detect(&compressed));
            let decompressed = codec.decompress(&compressed, None).unwrap();
            assert_eq!(decompressed, data);
        }
    }

    #[test]
    fn detect_rejects_foreign_bytes() {
        let codec = ZstdCodec;
        assert!(!codec.detect(b"not a zstd frame"));
        assert!(!codec.detect(&[0x28, 0xB5]));
    }
}
