//! Atomic file replacement
//!
//! Writes go to a sibling `<name>.tmp` file which is flushed to disk and then
//! renamed over the target. A crash at any point leaves either the previous
//! file or the new one, never a truncated mix.

use crate::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Path of the temporary sibling used while replacing `path`
pub fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("path has no file name: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

/// Replace `path` with `contents` atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_with_mode(path, contents, None)
}

/// Replace `path` with `contents` atomically, restricting permissions to
/// the owner (0600) on Unix. Used for files holding credentials.
pub fn write_atomic_private(path: &Path, contents: &[u8]) -> Result<()> {
    write_with_mode(path, contents, Some(0o600))
}

fn write_with_mode(path: &Path, contents: &[u8], mode: Option<u32>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path_for(path)?;
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    if let Err(e) = fs::rename(&tmp, path) {
        // Leave no stray temp file behind on failure
        let _ = fs::remove_file(&tmp);
        return Err(Error::Io(e));
    }

    tracing::trace!(path = %path.display(), bytes = contents.len(), "Atomic write complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_appends_suffix() {
        let tmp = temp_path_for(Path::new("/data/scan_state.json")).unwrap();
        assert_eq!(tmp, PathBuf::from("/data/scan_state.json.tmp"));
    }

    #[test]
    fn test_temp_path_rejects_root() {
        assert!(temp_path_for(Path::new("/")).is_err());
    }

    #[test]
    fn test_write_creates_file_and_cleans_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("state.json");

        write_atomic(&target, b"{\"a\":1}").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"a\":1}");
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("state.json");

        write_atomic(&target, b"first version, rather long").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn test_write_creates_missing_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("deeper").join("state.json");

        write_atomic(&target, b"x").unwrap();
        assert!(target.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_private_write_sets_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("config.toml");

        write_atomic_private(&target, b"access_token = \"abc\"").unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
