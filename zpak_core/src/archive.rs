use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::{validate_relative_path, Manifest, ManifestEntry, MANIFEST_VERSION};
use crate::serializer::{decode_manifest, encode_manifest};

/// In-memory representation of `{manifest, contiguous data region}`.
///
/// Built either by repeated [`Archive::add_file`] calls (encoding) or in one
/// shot by [`Archive::parse`] (decoding). The manifest and data buffer are
/// ordinary owned fields — no separate destructor is needed, they drop with
/// the `Archive`.
pub struct Archive {
    manifest: Manifest,
    data: Vec<u8>,
}

impl Archive {
    /// Create an empty archive that will be compressed with `algorithm_id`.
    pub fn new(algorithm_id: u8) -> Self {
        Self {
            manifest: Manifest::new(algorithm_id),
            data: Vec::new(),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.manifest.entries
    }

    pub fn data_len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Append `bytes` under `rel_path`, recording its offset and CRC-32.
    pub fn add_file(&mut self, rel_path: &str, bytes: &[u8]) -> Result<()> {
        validate_relative_path(rel_path)?;
        if self
            .manifest
            .entries
            .iter()
            .any(|e| e.original_path == rel_path)
        {
            return Err(Error::CorruptedData(format!(
                "duplicate path in manifest: {rel_path:?}"
            )));
        }

        let offset = self.data.len() as u64;
        self.data.extend_from_slice(bytes);
        let checksum = crc32fast::hash(bytes);

        self.manifest.entries.push(ManifestEntry {
            original_path: rel_path.to_string(),
            encoded_path: format!("offset:{offset}"),
            original_size: bytes.len() as u64,
            encoded_size: bytes.len() as u64,
            checksum,
        });
        Ok(())
    }

    /// Emit `[u64 manifest_size][manifest_bytes][data_bytes]`.
    pub fn serialize(&self) -> Vec<u8> {
        let manifest_bytes = encode_manifest(&self.manifest);
        let mut out = Vec::with_capacity(8 + manifest_bytes.len() + self.data.len());
        out.extend_from_slice(&(manifest_bytes.len() as u64).to_le_bytes());
        out.extend_from_slice(&manifest_bytes);
        out.extend_from_slice(&self.data);
        out
    }

    /// Reconstruct an archive from a decompressed `[header][manifest][data]`
    /// buffer, validating the structural invariants up front so a malformed
    /// manifest fails fast instead of surfacing mid-extraction.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(Error::InvalidArchive(format!(
                "file is {} bytes, too short to hold the 8-byte manifest_size header",
                bytes.len()
            )));
        }
        let manifest_size = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
        if bytes.len() < 8 + manifest_size {
            return Err(Error::InvalidArchive(format!(
                "manifest_size {manifest_size} exceeds the {} bytes available after the header",
                bytes.len() - 8
            )));
        }

        let manifest_bytes = &bytes[8..8 + manifest_size];
        let manifest = decode_manifest(manifest_bytes)?;
        let data = bytes[8 + manifest_size..].to_vec();

        let archive = Self { manifest, data };
        archive.validate()?;
        Ok(archive)
    }

    /// Check the invariants from the data model: non-decreasing, in-bounds,
    /// non-overlapping offsets; matching checksums come later (per entry,
    /// during extraction) so a corrupted manifest is rejected without first
    /// paying for a full CRC pass over data it may not even cover.
    fn validate(&self) -> Result<()> {
        if self.manifest.version > MANIFEST_VERSION {
            return Err(Error::UnsupportedManifestVersion(self.manifest.version));
        }

        let mut seen = std::collections::HashSet::new();
        let mut prev_offset = 0u64;
        for entry in &self.manifest.entries {
            validate_relative_path(&entry.original_path)?;
            if !seen.insert(entry.original_path.as_str()) {
                return Err(Error::CorruptedData(format!(
                    "duplicate path in manifest: {:?}",
                    entry.original_path
                )));
            }
            if entry.original_size != entry.encoded_size {
                return Err(Error::CorruptedData(format!(
                    "entry {:?} has original_size {} != encoded_size {}",
                    entry.original_path, entry.original_size, entry.encoded_size
                )));
            }
            let offset = entry.offset()?;
            if offset < prev_offset {
                return Err(Error::CorruptedData(format!(
                    "entry {:?} offset {offset} is out of order (previous offset {prev_offset})",
                    entry.original_path
                )));
            }
            let end = offset.checked_add(entry.original_size).ok_or_else(|| {
                Error::CorruptedData(format!(
                    "entry {:?} offset+size overflows u64",
                    entry.original_path
                ))
            })?;
            if end > self.data.len() as u64 {
                return Err(Error::CorruptedData(format!(
                    "entry {:?} spans [{offset}, {end}) but data region is only {} bytes",
                    entry.original_path,
                    self.data.len()
                )));
            }
            prev_offset = end;
        }
        Ok(())
    }

    /// Write every entry's bytes under `out_dir`, verifying each CRC-32
    /// before it's written. Aborts on the first checksum mismatch without
    /// rolling back files already written.
    pub fn extract(&self, out_dir: &Path) -> Result<()> {
        for entry in &self.manifest.entries {
            let dest = resolve_extraction_path(out_dir, &entry.original_path)?;

            let offset = entry.offset()? as usize;
            let size = entry.original_size as usize;
            let end = offset
                .checked_add(size)
                .ok_or_else(|| Error::CorruptedData(format!("entry {:?} offset+size overflows", entry.original_path)))?;
            if end > self.data.len() {
                return Err(Error::CorruptedData(format!(
                    "entry {:?} spans [{offset}, {end}) but data region is only {} bytes",
                    entry.original_path,
                    self.data.len()
                )));
            }

            let bytes = &self.data[offset..end];
            let actual = crc32fast::hash(bytes);
            if actual != entry.checksum {
                return Err(Error::ChecksumMismatch {
                    path: entry.original_path.clone(),
                    expected: entry.checksum,
                    actual,
                });
            }

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, bytes)?;
        }
        Ok(())
    }
}

/// Join `out_dir` with the forward-slash `original_path`, translating to the
/// host separator, and reject any result that would escape `out_dir`.
fn resolve_extraction_path(out_dir: &Path, original_path: &str) -> Result<PathBuf> {
    let mut dest = out_dir.to_path_buf();
    for component in original_path.split('/') {
        if component.is_empty() || component == "." {
            continue;
        }
        if component == ".." {
            return Err(Error::UnsafeExtractionPath(out_dir.join(original_path)));
        }
        dest.push(component);
    }
    if !dest.starts_with(out_dir) {
        return Err(Error::UnsafeExtractionPath(dest));
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_file_then_serialize_then_parse_round_trips() {
        let mut archive = Archive::new(1);
        archive.add_file("a.txt", b"hello").unwrap();
        archive.add_file("dir/b.bin", &[0xFFu8; 16]).unwrap();

        let bytes = archive.serialize();
        let parsed = Archive::parse(&bytes).unwrap();

        assert_eq!(parsed.entries().len(), 2);
        assert_eq!(parsed.entries()[0].original_path, "a.txt");
        assert_eq!(parsed.entries()[0].encoded_path, "offset:0");
        assert_eq!(parsed.entries()[1].encoded_path, "offset:5");
        assert_eq!(parsed.manifest().algorithm_id, Some(1));
    }

    #[test]
    fn rejects_duplicate_paths() {
        let mut archive = Archive::new(1);
        archive.add_file("a.txt", b"1").unwrap();
        let err = archive.add_file("a.txt", b"2").unwrap_err();
        assert!(matches!(err, Error::CorruptedData(_)));
    }

    #[test]
    fn rejects_escaping_paths() {
        let mut archive = Archive::new(1);
        let err = archive.add_file("../etc/passwd", b"x").unwrap_err();
        assert!(matches!(err, Error::CorruptedData(_)));
    }

    #[test]
    fn parse_truncated_header_is_invalid_archive() {
        let err = Archive::parse(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidArchive(_)));
    }

    #[test]
    fn parse_manifest_size_exceeding_buffer_is_invalid_archive() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1000u64.to_le_bytes());
        let err = Archive::parse(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidArchive(_)));
    }

    #[test]
    fn extract_detects_checksum_mismatch() {
        let mut archive = Archive::new(1);
        archive.add_file("a.txt", b"hello").unwrap();
        let mut bytes = archive.serialize();
        // Flip a data byte after the manifest so the CRC no longer matches.
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let parsed = Archive::parse(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = parsed.extract(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn extract_writes_nested_paths_with_host_separator() {
        let mut archive = Archive::new(1);
        archive.add_file("a/b/c.txt", b"nested").unwrap();
        let bytes = archive.serialize();
        let parsed = Archive::parse(&bytes).unwrap();

        let dir = tempfile::tempdir().unwrap();
        parsed.extract(dir.path()).unwrap();

        let expected = dir.path().join("a").join("b").join("c.txt");
        assert_eq!(fs::read(expected).unwrap(), b"nested");
    }

    #[test]
    fn empty_archive_round_trips() {
        let archive = Archive::new(1);
        let bytes = archive.serialize();
        let parsed = Archive::parse(&bytes).unwrap();
        assert_eq!(parsed.entries().len(), 0);

        let dir = tempfile::tempdir().unwrap();
        parsed.extract(dir.path()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_byte_file_round_trips() {
        let mut archive = Archive::new(1);
        archive.add_file("empty.txt", b"").unwrap();
        assert_eq!(archive.entries()[0].checksum, crc32fast::hash(b""));

        let bytes = archive.serialize();
        let parsed = Archive::parse(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();
        parsed.extract(dir.path()).unwrap();
        assert_eq!(fs::read(dir.path().join("empty.txt")).unwrap(), b"");
    }
}
