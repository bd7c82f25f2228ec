//! End-to-end coverage of `encode_dir` / `decode_file` against real codecs,
//! exercising the full `Encoder`/`Decoder` façade pair rather than the
//! lower-level `Archive` unit tests in `archive.rs`.
use std::fs;
use std::path::Path;

use zpak_codecs::Registry;
use zpak_core::codec::{Codec, Level};
use zpak_core::error::Error;
use zpak_core::{decode_file, encode_dir};

fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn round_trips_a_nested_tree_with_every_bundled_codec() {
    let registry = Registry::with_defaults();

    for codec in registry.all() {
        let src = tempfile::tempdir().unwrap();
        write_file(&src.path().join("top.txt"), b"top level file");
        write_file(&src.path().join("a/b/deep.txt"), &b"deep nested content".repeat(50));
        write_file(&src.path().join("a/sibling.bin"), &[0xAB; 4096]);

        let archive_dir = tempfile::tempdir().unwrap();
        let archive_path = archive_dir.path().join("out.zpak");
        let encode_report = encode_dir(src.path(), &archive_path, codec.as_ref(), Level::Medium).unwrap();
        assert_eq!(encode_report.file_count, 3);

        let dest = tempfile::tempdir().unwrap();
        let decode_report = decode_file(&archive_path, dest.path(), registry.all()).unwrap();
        assert_eq!(decode_report.file_count, 3);

        assert_eq!(fs::read(dest.path().join("top.txt")).unwrap(), b"top level file");
        assert_eq!(
            fs::read(dest.path().join("a/b/deep.txt")).unwrap(),
            b"deep nested content".repeat(50)
        );
        assert_eq!(fs::read(dest.path().join("a/sibling.bin")).unwrap(), vec![0xAB; 4096]);
    }
}

#[test]
fn round_trips_an_empty_directory() {
    let registry = Registry::with_defaults();
    let codec = registry.by_name("zstd").unwrap();

    let src = tempfile::tempdir().unwrap();
    let archive_dir = tempfile::tempdir().unwrap();
    let archive_path = archive_dir.path().join("out.zpak");
    let report = encode_dir(src.path(), &archive_path, codec.as_ref(), Level::Low).unwrap();
    assert_eq!(report.file_count, 0);

    let dest = tempfile::tempdir().unwrap();
    let decode_report = decode_file(&archive_path, dest.path(), registry.all()).unwrap();
    assert_eq!(decode_report.file_count, 0);
}

#[test]
fn round_trips_a_zero_byte_file() {
    let registry = Registry::with_defaults();
    let codec = registry.by_name("lz4").unwrap();

    let src = tempfile::tempdir().unwrap();
    write_file(&src.path().join("empty.dat"), b"");

    let archive_dir = tempfile::tempdir().unwrap();
    let archive_path = archive_dir.path().join("out.zpak");
    encode_dir(src.path(), &archive_path, codec.as_ref(), Level::Medium).unwrap();

    let dest = tempfile::tempdir().unwrap();
    decode_file(&archive_path, dest.path(), registry.all()).unwrap();
    assert_eq!(fs::read(dest.path().join("empty.dat")).unwrap(), b"");
}

#[test]
fn decode_detects_truncated_archive() {
    let registry = Registry::with_defaults();
    let codec = registry.by_name("zstd").unwrap();

    let src = tempfile::tempdir().unwrap();
    write_file(&src.path().join("a.txt"), b"some content to compress");

    let archive_dir = tempfile::tempdir().unwrap();
    let archive_path = archive_dir.path().join("out.zpak");
    encode_dir(src.path(), &archive_path, codec.as_ref(), Level::Medium).unwrap();

    let mut bytes = fs::read(&archive_path).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&archive_path, &bytes).unwrap();

    let dest = tempfile::tempdir().unwrap();
    let err = decode_file(&archive_path, dest.path(), registry.all()).unwrap_err();
    assert!(matches!(err, Error::DecompressionFailed(_) | Error::InvalidArchive(_) | Error::CorruptedData(_)));
}

#[test]
fn decode_detects_corrupted_compressed_payload() {
    let registry = Registry::with_defaults();
    let codec = registry.by_name("zstd").unwrap();

    let src = tempfile::tempdir().unwrap();
    write_file(&src.path().join("a.txt"), b"some content to compress, long enough to matter");

    let archive_dir = tempfile::tempdir().unwrap();
    let archive_path = archive_dir.path().join("out.zpak");
    encode_dir(src.path(), &archive_path, codec.as_ref(), Level::Medium).unwrap();

    let mut bytes = fs::read(&archive_path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    fs::write(&archive_path, &bytes).unwrap();

    let dest = tempfile::tempdir().unwrap();
    let result = decode_file(&archive_path, dest.path(), registry.all());
    assert!(result.is_err());
}

#[test]
fn decode_reports_path_not_found_for_missing_input() {
    let registry = Registry::with_defaults();
    let dest = tempfile::tempdir().unwrap();
    let err = decode_file(Path::new("/nonexistent/path/to/nowhere.zpak"), dest.path(), registry.all()).unwrap_err();
    assert!(matches!(err, Error::PathNotFound(_)));
}

#[test]
fn every_compression_level_round_trips() {
    let registry = Registry::with_defaults();
    let codec = registry.by_name("zstd").unwrap();

    for level in [Level::Low, Level::Medium, Level::High] {
        let src = tempfile::tempdir().unwrap();
        write_file(&src.path().join("f.txt"), &b"payload bytes for level test".repeat(20));

        let archive_dir = tempfile::tempdir().unwrap();
        let archive_path = archive_dir.path().join("out.zpak");
        encode_dir(src.path(), &archive_path, codec.as_ref(), level).unwrap();

        let dest = tempfile::tempdir().unwrap();
        decode_file(&archive_path, dest.path(), registry.all()).unwrap();
        assert_eq!(
            fs::read(dest.path().join("f.txt")).unwrap(),
            b"payload bytes for level test".repeat(20)
        );
    }
}

/// spec.md §8 seed case 6: encode with Brotli, then re-compress the same
/// inner (manifest + data) bytes with Zstd without touching the manifest's
/// `algorithm_id` — it still reads Brotli's id. Decoding must succeed by
/// detecting Zstd's magic bytes rather than trusting the now-stale id.
#[test]
fn decodes_via_content_detection_when_recompressed_with_a_different_codec() {
    let registry = Registry::with_defaults();
    let brotli = registry.by_name("brotli").unwrap();
    let zstd = registry.by_name("zstd").unwrap();

    let src = tempfile::tempdir().unwrap();
    write_file(&src.path().join("a.txt"), b"cross-codec re-compression test payload");

    let archive_dir = tempfile::tempdir().unwrap();
    let archive_path = archive_dir.path().join("out.zpak");
    encode_dir(src.path(), &archive_path, brotli.as_ref(), Level::Medium).unwrap();

    let brotli_bytes = fs::read(&archive_path).unwrap();
    let inner = brotli.decompress(&brotli_bytes, None).unwrap();
    let recompressed = zstd.compress(&inner, Level::Medium).unwrap();
    fs::write(&archive_path, &recompressed).unwrap();

    let dest = tempfile::tempdir().unwrap();
    let report = decode_file(&archive_path, dest.path(), registry.all()).unwrap();
    assert_eq!(report.file_count, 1);
    assert_eq!(
        fs::read(dest.path().join("a.txt")).unwrap(),
        b"cross-codec re-compression test payload"
    );
}
