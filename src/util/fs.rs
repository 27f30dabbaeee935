//! Filesystem utilities.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` atomically.
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over `path`. On failure the temporary file is removed and any
/// existing file at `path` is left untouched.
///
/// A replaced file keeps its permissions. A new file gets the same mode a
/// plain `fs::write` would give it.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".amake-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like any other newly created file.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder.tempfile_in(dir)?;
    if let Ok(existing) = fs::metadata(path) {
        if existing.is_file() {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
    }
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");

        write_atomic(&path, "all :\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "all :\n");
        assert_eq!(entries(tmp.path()), vec!["Makefile"]);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        fs::write(&path, "old contents that are longer than the new ones\n").unwrap();

        write_atomic(&path, "new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert_eq!(entries(tmp.path()), vec!["Makefile"]);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("Makefile");

        assert!(write_atomic(&path, "x").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_atomic_onto_directory_keeps_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        fs::create_dir(&path).unwrap();

        assert!(write_atomic(&path, "x").is_err());
        assert!(path.is_dir());
        assert_eq!(entries(tmp.path()), vec!["Makefile"]);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_new_file_mode_matches_plain_write() {
        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("plain");
        let path = tmp.path().join("Makefile");

        fs::write(&plain, "x").unwrap();
        write_atomic(&path, "x").unwrap();

        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Makefile");
        fs::write(&path, "old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "new\n").unwrap();

        assert_eq!(mode(&path), 0o640);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }
}
