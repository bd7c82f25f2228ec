use std::fs;
use std::path::Path;
use std::time::Instant;

use walkdir::WalkDir;

use crate::archive::Archive;
use crate::codec::{Codec, Level};
use crate::error::Result;

/// Summary of one `encode_dir` run, returned to the caller (the CLI prints
/// it; a library caller can use it for its own reporting).
#[derive(Debug, Clone)]
pub struct EncodeReport {
    pub file_count: u64,
    pub raw_size: u64,
    pub compressed_size: u64,
    pub elapsed_secs: f64,
}

/// Walk `input_root` depth-first in alphabetical order, pack every regular
/// file into an archive, compress the whole thing with `codec` at `level`,
/// and atomically write it to `output`.
///
/// Non-regular files (symlinks, sockets, devices, FIFOs) are silently
/// skipped. Directories produce no entries of their own.
pub fn encode_dir(
    input_root: &Path,
    output: &Path,
    codec: &dyn Codec,
    level: Level,
) -> Result<EncodeReport> {
    let t0 = Instant::now();
    let mut archive = Archive::new(codec.id());

    let walker = WalkDir::new(input_root).follow_links(false).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(input_root)
            .unwrap_or(entry.path());
        let rel_path = to_forward_slash(rel);
        let bytes = fs::read(entry.path())?;
        log::debug!("packing {rel_path} ({} bytes)", bytes.len());
        archive.add_file(&rel_path, &bytes)?;
    }

    let file_count = archive.entries().len() as u64;
    let raw_size = archive.data_len();

    let serialized = archive.serialize();
    let compressed = codec
        .compress(&serialized, level)
        .map_err(|e| crate::error::Error::CompressionFailed(e.to_string()))?;

    write_atomically(output, &compressed)?;

    log::info!(
        "encoded {file_count} files ({raw_size} raw bytes) into {} ({} compressed bytes) using {}",
        output.display(),
        compressed.len(),
        codec.name()
    );

    Ok(EncodeReport {
        file_count,
        raw_size,
        compressed_size: compressed.len() as u64,
        elapsed_secs: t0.elapsed().as_secs_f64(),
    })
}

fn to_forward_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `bytes` to `path` by writing a sibling temp file then renaming it
/// into place — `rename` is atomic within the same filesystem, so a reader
/// never observes a partially written archive.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_name = format!(
        ".{}.tmp",
        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
    );
    let tmp_path = parent.join(tmp_name);
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
