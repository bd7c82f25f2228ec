use std::io::{Read, Write};

use lzma_rust2::{LZMA2Reader, LZMA2Writer, LZMAOptions};

use zpak_core::codec::{Codec, Level};
use zpak_core::error::{Error, Result};
use zpak_core::format::CODEC_LZMA;

/// Dictionary size used on both ends of the stream. Fixed rather than
/// derived from the input, so a decoder never needs to guess it.
const DICT_SIZE: u32 = 1 << 24;

pub struct LzmaCodec;

fn level_to_preset(level: Level) -> u32 {
    match level {
        Level::Low => 1,
        Level::Medium => 3,
        Level::High => 9,
    }
}

impl Codec for LzmaCodec {
    fn id(&self) -> u8 {
        CODEC_LZMA
    }

    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, input: &[u8], level: Level) -> Result<Vec<u8>> {
        let options = LZMAOptions::with_preset(level_to_preset(level));
        let mut writer = LZMA2Writer::new(Vec::new(), options);
        writer
            .write_all(input)
            .map_err(|e| Error::CompressionFailed(format!("lzma: {e}")))?;
        writer
            .finish()
            .map_err(|e| Error::CompressionFailed(format!("lzma: {e}")))
    }

    /// LZMA2 streams carry no end-of-stream size field here (no container
    /// header is written), so decoding just reads until EOF; `hint_original_size`
    /// is only used to pre-size the output buffer.
    fn decompress(&self, input: &[u8], hint_original_size: Option<u64>) -> Result<Vec<u8>> {
        let mut reader = LZMA2Reader::new(input, DICT_SIZE, None);
        let mut out = Vec::with_capacity(hint_original_size.unwrap_or(input.len() as u64 * 3) as usize);
        reader
            .read_to_end(&mut out)
            .map_err(|e| Error::DecompressionFailed(format!("lzma: {e}")))?;
        Ok(out)
    }

    fn bound(&self, input_len: usize) -> usize {
        input_len + input_len / 3 + 256
    }

    fn detect(&self, _bytes: &[u8]) -> bool {
        // A headerless LZMA2 stream has no magic bytes to sniff.
        false
    }
}
