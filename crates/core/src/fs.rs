//! Filesystem utilities

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Ensure a directory exists, creating it and its parents if necessary.
///
/// Returns `true` when the directory had to be created.
pub fn ensure_dir_exists(path: &Path) -> io::Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Write `contents` to `path` so that readers never observe a partial file.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over `path`. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir_exists(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b/c");

        assert!(ensure_dir_exists(&nested).unwrap());
        assert!(nested.is_dir());
        assert!(!ensure_dir_exists(&nested).unwrap());
    }

    #[test]
    fn test_write_atomic_replaces_contents() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("series/1000842.csv");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        // only the target is left behind, no stray temp files
        let entries = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
