//! Hand-written, length-prefixed encoder/decoder for the two manifest record
//! types (`Manifest`, `ManifestEntry`).
//!
//! This is deliberately not a general-purpose reflective serializer — the
//! wire layout in `format.rs`'s module doc is the authority, and these two
//! functions are its only implementation. Every length prefix is an
//! unaligned little-endian `u64`:
//!
//! - fixed-width primitives are written as their native little-endian image
//! - `[u8]` is written raw, framed only by the enclosing length prefix
//! - a `Vec<T>` (T != u8) is `u64 count` then `count` elements, each itself
//!   preceded by a `u64` element length
//! - a struct is each field, in order, as `u64 field_len` + payload
//! - an absent `Option<T>` is a zero-length field

use crate::error::{Error, Result};
use crate::format::{Manifest, ManifestEntry};

// ── little encode helpers ──────────────────────────────────────────────────

fn push_len_prefixed(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
}

fn encode_entry(entry: &ManifestEntry) -> Vec<u8> {
    let mut out = Vec::new();
    push_len_prefixed(&mut out, entry.original_path.as_bytes());
    push_len_prefixed(&mut out, entry.encoded_path.as_bytes());
    push_len_prefixed(&mut out, &entry.original_size.to_le_bytes());
    push_len_prefixed(&mut out, &entry.encoded_size.to_le_bytes());
    push_len_prefixed(&mut out, &entry.checksum.to_le_bytes());
    out
}

/// Encode a `Manifest` into its serializer payload (the bytes that sit
/// between the 8-byte `manifest_size` header and the data region).
pub fn encode_manifest(manifest: &Manifest) -> Vec<u8> {
    let mut out = Vec::new();

    push_len_prefixed(&mut out, &manifest.version.to_le_bytes());

    let mut entries_field = Vec::new();
    entries_field.extend_from_slice(&(manifest.entries.len() as u64).to_le_bytes());
    for entry in &manifest.entries {
        let elem = encode_entry(entry);
        entries_field.extend_from_slice(&(elem.len() as u64).to_le_bytes());
        entries_field.extend_from_slice(&elem);
    }
    push_len_prefixed(&mut out, &entries_field);

    match manifest.algorithm_id {
        Some(id) => push_len_prefixed(&mut out, &[id]),
        None => out.extend_from_slice(&0u64.to_le_bytes()),
    }

    out
}

// ── decode cursor ───────────────────────────────────────────────────────────

/// A read-only cursor over the manifest payload, tracking the remaining
/// slice so every length prefix can be checked against what's actually left.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take_u64(&mut self, what: &str) -> Result<u64> {
        if self.remaining() < 8 {
            return Err(Error::CorruptedData(format!(
                "truncated {what} length prefix: {} bytes remaining, need 8",
                self.remaining()
            )));
        }
        let bytes: [u8; 8] = self.buf[self.pos..self.pos + 8].try_into().unwrap();
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read a `u64 field_len` prefix, then return exactly that many bytes.
    fn take_field(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.take_u64(what)? as usize;
        if len > self.remaining() {
            return Err(Error::CorruptedData(format!(
                "{what} declares length {len} but only {} bytes remain",
                self.remaining()
            )));
        }
        let field = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(field)
    }
}

fn decode_u32(field: &[u8], what: &str) -> Result<u32> {
    field
        .try_into()
        .map(u32::from_le_bytes)
        .map_err(|_| Error::CorruptedData(format!("{what} has length {} but expected 4", field.len())))
}

fn decode_u64(field: &[u8], what: &str) -> Result<u64> {
    field
        .try_into()
        .map(u64::from_le_bytes)
        .map_err(|_| Error::CorruptedData(format!("{what} has length {} but expected 8", field.len())))
}

fn decode_string(field: &[u8], what: &str) -> Result<String> {
    String::from_utf8(field.to_vec())
        .map_err(|e| Error::CorruptedData(format!("{what} is not valid UTF-8: {e}")))
}

fn decode_entry(bytes: &[u8]) -> Result<ManifestEntry> {
    let mut cur = Cursor::new(bytes);
    let original_path = decode_string(cur.take_field("entry.original_path")?, "entry.original_path")?;
    let encoded_path = decode_string(cur.take_field("entry.encoded_path")?, "entry.encoded_path")?;
    let original_size = decode_u64(cur.take_field("entry.original_size")?, "entry.original_size")?;
    let encoded_size = decode_u64(cur.take_field("entry.encoded_size")?, "entry.encoded_size")?;
    let checksum = decode_u32(cur.take_field("entry.checksum")?, "entry.checksum")?;
    Ok(ManifestEntry {
        original_path,
        encoded_path,
        original_size,
        encoded_size,
        checksum,
    })
}

/// Decode a `Manifest` from its serializer payload. Fails with
/// `Error::CorruptedData` on truncation, an over-long declared field, an
/// element count whose minimum per-element size exceeds what remains, or a
/// primitive field whose length doesn't match its expected width.
pub fn decode_manifest(bytes: &[u8]) -> Result<Manifest> {
    let mut cur = Cursor::new(bytes);

    let version = decode_u32(cur.take_field("manifest.version")?, "manifest.version")?;

    let entries_field = cur.take_field("manifest.entries")?;
    let mut entries_cur = Cursor::new(entries_field);
    let count = entries_cur.take_u64("manifest.entries.count")?;

    // Each element contributes at least an 8-byte length prefix; reject an
    // implausible count before allocating a `Vec` sized to it.
    const MIN_ELEM_SIZE: u64 = 8;
    if count.saturating_mul(MIN_ELEM_SIZE) > entries_cur.remaining() as u64 {
        return Err(Error::CorruptedData(format!(
            "manifest declares {count} entries but only {} bytes remain, \
             which cannot hold even the minimum per-entry size",
            entries_cur.remaining()
        )));
    }

    let mut entries = Vec::with_capacity(count as usize);
    for i in 0..count {
        let elem = entries_cur.take_field(&format!("manifest.entries[{i}]"))?;
        entries.push(decode_entry(elem)?);
    }

    let algorithm_field = cur.take_field("manifest.algorithm_id")?;
    let algorithm_id = match algorithm_field.len() {
        0 => None,
        1 => Some(algorithm_field[0]),
        n => {
            return Err(Error::CorruptedData(format!(
                "manifest.algorithm_id has length {n} but expected 0 or 1"
            )))
        }
    };

    Ok(Manifest {
        version,
        entries,
        algorithm_id,
    })
}
