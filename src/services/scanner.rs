//! Mod directory scanning.
//!
//! Lists the regular files directly inside each candidate directory. No
//! extension filtering happens here; interpreting names (including the
//! `.disabled` suffix) is the reconciler's job.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// List regular files in each of `dirs`, non-recursively.
///
/// Files are returned in filesystem enumeration order, directory by directory.
/// A directory that cannot be read contributes nothing and is reported as a
/// warning; entries that cannot be inspected are skipped the same way.
pub fn scan_mod_paths(dirs: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let mut paths = Vec::new();

    for dir in dirs {
        let found = scan_directory(dir);
        tracing::debug!("Found {} files in {}", found.len(), dir);
        paths.extend(found);
    }

    paths
}

fn scan_directory(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to read mod directory {}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut files = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry in {}: {}", dir, e);
                continue;
            }
        };

        // Follows symlinks so linked mod files count as regular files
        let is_file = match fs::metadata(entry.path()) {
            Ok(metadata) => metadata.is_file(),
            Err(e) => {
                tracing::warn!("Failed to stat {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if !is_file {
            continue;
        }

        match Utf8PathBuf::from_path_buf(entry.path()) {
            Ok(path) => files.push(path),
            Err(path) => {
                tracing::warn!("Skipping mod file with non UTF-8 name: {}", path.display());
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_scan_lists_regular_files_only() {
        let (_guard, root) = temp_dir();
        fs::write(root.join("a.jar"), b"").unwrap();
        fs::write(root.join("b.jar.disabled"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("deep.jar"), b"").unwrap();

        let mut found = scan_mod_paths(&[root.clone()]);
        found.sort();

        assert_eq!(
            found,
            vec![root.join("a.jar"), root.join("b.jar.disabled"), root.join("notes.txt")]
        );
    }

    #[test]
    fn test_missing_directory_does_not_abort_scan() {
        let (_guard, root) = temp_dir();
        fs::write(root.join("a.jar"), b"").unwrap();

        let found = scan_mod_paths(&[root.join("missing"), root.clone()]);

        assert_eq!(found, vec![root.join("a.jar")]);
    }

    #[test]
    fn test_empty_directory() {
        let (_guard, root) = temp_dir();
        assert!(scan_mod_paths(&[root]).is_empty());
        assert!(scan_mod_paths(&[]).is_empty());
    }
}
