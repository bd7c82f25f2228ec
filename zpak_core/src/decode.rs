use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::archive::Archive;
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::format::MANIFEST_VERSION;

#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub file_count: u64,
    pub raw_size: u64,
    pub elapsed_secs: f64,
}

/// Decompress `input`, parse its manifest, verify every checksum, and
/// rewrite each file under `out_dir`.
///
/// `codecs` is the full set of registered codecs, in registration order,
/// used for both magic-byte detection and the trial-decompression fallback.
/// See `open_archive` for why the manifest's `algorithm_id` can't drive this
/// choice directly.
pub fn decode_file(input: &Path, out_dir: &Path, codecs: &[Arc<dyn Codec>]) -> Result<DecodeReport> {
    let t0 = Instant::now();

    if !input.exists() {
        return Err(Error::PathNotFound(input.to_path_buf()));
    }
    let file_bytes = fs::read(input)?;

    let (archive, codec_used) = open_archive(&file_bytes, codecs)?;

    if archive.manifest().version > MANIFEST_VERSION {
        return Err(Error::UnsupportedManifestVersion(archive.manifest().version));
    }

    archive.extract(out_dir)?;

    log::info!(
        "decoded {} files ({} raw bytes) from {} using {}",
        archive.entries().len(),
        archive.data_len(),
        input.display(),
        codec_used.name()
    );

    Ok(DecodeReport {
        file_count: archive.entries().len() as u64,
        raw_size: archive.data_len(),
        elapsed_secs: t0.elapsed().as_secs_f64(),
    })
}

/// Resolve the outer codec and produce a parsed `Archive`.
///
/// The manifest's `algorithm_id` lives *inside* the compressed payload, so it
/// can never be consulted before something has already decompressed the
/// file — there is no way to read it first. This decompresses speculatively
/// (magic-byte detection, falling back to trying every registered codec in
/// registration order) and treats whichever codec actually produces a
/// parseable archive as authoritative, full stop. If the manifest's
/// `algorithm_id` disagrees with that codec — stale metadata left over from
/// an outer payload that was re-compressed with a different codec after the
/// manifest was written — content detection still wins; decoding must not
/// fail just because the recorded id is out of date.
fn open_archive<'c>(file_bytes: &[u8], codecs: &'c [Arc<dyn Codec>]) -> Result<(Archive, &'c Arc<dyn Codec>)> {
    if let Some(codec) = detect_codec(file_bytes, codecs) {
        if let Ok(archive) = try_decode_with(codec, file_bytes) {
            warn_on_stale_algorithm_id(&archive, codec);
            return Ok((archive, codec));
        }
    }

    for codec in codecs {
        if let Ok(archive) = try_decode_with(codec, file_bytes) {
            warn_on_stale_algorithm_id(&archive, codec);
            return Ok((archive, codec));
        }
    }

    Err(Error::DecompressionFailed(
        "no registered codec could decompress this file".to_string(),
    ))
}

fn detect_codec<'c>(file_bytes: &[u8], codecs: &'c [Arc<dyn Codec>]) -> Option<&'c Arc<dyn Codec>> {
    codecs.iter().find(|c| c.detect(file_bytes))
}

fn try_decode_with(codec: &Arc<dyn Codec>, file_bytes: &[u8]) -> Result<Archive> {
    let decompressed = codec
        .decompress(file_bytes, None)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;
    Archive::parse(&decompressed)
}

fn warn_on_stale_algorithm_id(archive: &Archive, codec_used: &Arc<dyn Codec>) {
    if let Some(id) = archive.manifest().algorithm_id {
        if id != codec_used.id() {
            log::warn!(
                "manifest algorithm_id {id} does not match the codec that actually decoded \
                 this archive ({}, id {}); the outer payload was likely re-compressed after \
                 the manifest was written — proceeding with the codec content detection found",
                codec_used.name(),
                codec_used.id()
            );
        }
    }
}
