//! Working directory lifecycle
//!
//! The directory is wiped and recreated before a run and removed afterwards
//! unless the caller asks to keep it.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Clear any leftovers and create the directory
    pub fn prepare(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        match std::fs::remove_dir_all(&path) {
            Ok(()) => info!(path = %path.display(), "Removed previous working directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Could not clean working directory"),
        }
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Downloaded source file
    pub fn download_path(&self, file_name: &str) -> PathBuf {
        self.path.join(format!("{}.mp4", file_name))
    }

    /// Processed clip
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.path.join(format!("{}_cut.mp4", file_name))
    }

    /// Remove the directory, or leave it in place when `remove` is false
    pub fn finish(self, remove: bool) {
        if !remove {
            info!(path = %self.path.display(), "Keeping working directory");
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Working directory removed"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove working directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_clears_leftovers() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("temp");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("old.mp4"), b"stale").unwrap();

        let work = WorkDir::prepare(&dir).unwrap();

        assert!(work.path().is_dir());
        assert!(!dir.join("old.mp4").exists());
    }

    #[test]
    fn test_paths() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::prepare(root.path().join("w")).unwrap();
        assert_eq!(work.download_path("Song_by_Band"), root.path().join("w/Song_by_Band.mp4"));
        assert_eq!(work.output_path("Song_by_Band"), root.path().join("w/Song_by_Band_cut.mp4"));
    }

    #[test]
    fn test_finish_removes_or_keeps() {
        let root = tempfile::tempdir().unwrap();

        let kept = root.path().join("kept");
        WorkDir::prepare(&kept).unwrap().finish(false);
        assert!(kept.is_dir());

        let removed = root.path().join("removed");
        WorkDir::prepare(&removed).unwrap().finish(true);
        assert!(!removed.exists());
    }
}
