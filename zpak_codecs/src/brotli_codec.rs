use std::io::{Read, Write};

use zpak_core::codec::{Codec, Level};
use zpak_core::error::{Error, Result};
use zpak_core::format::CODEC_BROTLI;

const BUFFER_SIZE: usize = 4096;
const LG_WIN: i32 = 22;

pub struct BrotliCodec;

fn level_to_quality(level: Level) -> i32 {
    match level {
        Level::Low => 3,
        Level::Medium => 6,
        Level::High => 11,
    }
}

impl Codec for BrotliCodec {
    fn id(&self) -> u8 {
        CODEC_BROTLI
    }

    fn name(&self) -> &'static str {
        "brotli"
    }

    fn compress(&self, input: &[u8], level: Level) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut writer =
                brotli::CompressorWriter::new(&mut out, BUFFER_SIZE, level_to_quality(level) as u32, LG_WIN as u32);
            writer
                .write_all(input)
                .map_err(|e| Error::CompressionFailed(format!("brotli: {e}")))?;
            writer
                .flush()
                .map_err(|e| Error::CompressionFailed(format!("brotli: {e}")))?;
        }
        Ok(out)
    }

    fn decompress(&self, input: &[u8], hint_original_size: Option<u64>) -> Result<Vec<u8>> {
        let mut reader = brotli::Decompressor::new(input, BUFFER_SIZE);
        let mut out = Vec::with_capacity(hint_original_size.unwrap_or(input.len() as u64 * 3) as usize);
        reader
            .read_to_end(&mut out)
            .map_err(|e| Error::DecompressionFailed(format!("brotli: {e}")))?;
        Ok(out)
    }

    fn bound(&self, input_len: usize) -> usize {
        // Brotli has no exact worst-case formula exposed by this crate;
        // the format guarantees expansion never exceeds roughly 0.3% plus a
        // few bytes, so pad generously.
        input_len + input_len / 128 + 64
    }

    fn detect(&self, _bytes: &[u8]) -> bool {
        // Brotli streams have no reserved magic bytes.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let codec = BrotliCodec;
        let data = b"brotli brotli brotli test data payload".repeat(60);
        for level in [Level::Low, Level::Medium, Level::High] {
            let compressed = codec.compress(&data, level).unwrap();
            let decompressed = codec.decompress(&compressed, Some(data.len() as u64)).unwrap();
            assert_eq!(decompressed, data);
        }
    }

    #[test]
    fn empty_input_round_trips() {
        let codec = BrotliCodec;
        let compressed = codec.compress(&[], Level::Medium).unwrap();
        let decompressed = codec.decompress(&compressed, None).unwrap();
        assert!(decompressed.is_empty());
    }

    #[test]
    fn never_detects() {
        assert!(!BrotliCodec.detect(b"anything"));
    }
}
