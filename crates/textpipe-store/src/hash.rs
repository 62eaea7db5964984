//! Blake3 fingerprints for source-file change detection

use std::io;
use std::path::Path;

/// Hash a file's contents with blake3.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize())
}

/// Hash raw bytes with blake3.
pub fn hash_bytes(data: &[u8]) -> blake3::Hash {
    blake3::hash(data)
}

/// Hex fingerprint of a source file, recorded in meta.json and compared by
/// the update checker.
pub fn fingerprint(path: &Path) -> io::Result<String> {
    Ok(hash_file(path)?.to_hex().to_string())
}
