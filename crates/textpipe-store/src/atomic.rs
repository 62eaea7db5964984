//! Atomic file replacement: write to a sibling tmp file, then rename

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `bytes` to `path` via tmp-then-rename.
///
/// The tmp file lives in the same directory so the rename is atomic; a
/// reader sees either the previous content or the new content, never a
/// truncated file. On failure the tmp file is removed and the previous
/// content is left intact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Remove stale .tmp files left by an interrupted writer.
pub fn cleanup_tmp_files(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fulltext.txt");
        write_atomic(&path, b"body").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"body");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn failed_write_leaves_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        write_atomic(&path, b"original").unwrap();

        // Write into a missing directory fails; the good file is untouched
        let missing_parent = dir.path().join("gone").join("meta.json");
        assert!(write_atomic(&missing_parent, b"x").is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn no_tmp_residue_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing_parent = dir.path().join("gone").join("fulltext.txt");
        assert!(write_atomic(&missing_parent, b"x").is_err());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn cleanup_removes_only_tmp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meta.json"), b"keep").unwrap();
        fs::write(dir.path().join("meta.json.tmp"), b"stale").unwrap();

        let removed = cleanup_tmp_files(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("meta.json").exists());
        assert!(!dir.path().join("meta.json.tmp").exists());
    }
}
