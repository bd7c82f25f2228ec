use zpak_core::codec::{Codec, Level};
use zpak_core::error::{Error, Result};
use zpak_core::format::CODEC_LZ4;

/// LZ4 raw-block codec.
///
/// Deliberately uses the unprefixed block format (no stored size, no magic
/// bytes) rather than `lz4_flex`'s size-prepending helpers, so that
/// decompression without a size hint has to fall back to the speculative
/// doubling strategy documented on [`Lz4Codec::decompress`] — this is the
/// acknowledged weakness of plain LZ4 framing.
pub struct Lz4Codec;

/// `acceleration` (faster/larger) for Low/Medium, then the high-compression
/// mode for High.
fn level_to_acceleration(level: Level) -> (i32, bool) {
    match level {
        Level::Low => (4, false),
        Level::Medium => (1, false),
        Level::High => (0, true), // HC level 9, acceleration unused
    }
}

impl Codec for Lz4Codec {
    fn id(&self) -> u8 {
        CODEC_LZ4
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, input: &[u8], level: Level) -> Result<Vec<u8>> {
        let (acceleration, use_hc) = level_to_acceleration(level);
        if use_hc {
            Ok(lz4_flex::block::compress_with_hc(input, 9))
        } else {
            Ok(lz4_flex::block::compress_with_acceleration(input, acceleration))
        }
    }

    /// With a hint, decompress straight into a buffer of that size. Without
    /// one, double a speculative output buffer starting at twice the
    /// compressed length, up to 16x the compressed length, failing if
    /// decoding still doesn't succeed — raw LZ4 blocks carry no terminator,
    /// so there is no way to know the real size in advance.
    fn decompress(&self, input: &[u8], hint_original_size: Option<u64>) -> Result<Vec<u8>> {
        if let Some(hint) = hint_original_size {
            return lz4_flex::block::decompress(input, hint as usize)
                .map_err(|e| Error::DecompressionFailed(format!("lz4: {e}")));
        }

        if input.is_empty() {
            return Ok(Vec::new());
        }

        let mut guess = (input.len() * 2).max(64);
        let ceiling = (input.len() * 16).max(64);
        loop {
            match lz4_flex::block::decompress(input, guess) {
                Ok(out) => return Ok(out),
                Err(_) if guess < ceiling => guess = (guess * 2).min(ceiling),
                Err(e) => {
                    return Err(Error::DecompressionFailed(format!(
                        "lz4: could not determine output size (gave up at {guess} bytes): {e}"
                    )))
                }
            }
        }
    }

    fn bound(&self, input_len: usize) -> usize {
        lz4_flex::block::get_maximum_output_size(input_len)
    }

    fn detect(&self, _bytes: &[u8]) -> bool {
        // Raw LZ4 blocks have no magic bytes to sniff.
        false
    }
}
