//! Byte sources for relative image paths.

use std::io;
use std::path::{Path, PathBuf};

/// Resolves paths referenced by a document to their bytes.
///
/// Paths are given exactly as they appear in the document, after URL
/// decoding, and are relative to the source's root.
pub trait ContentSource: Send + Sync {
    /// Read the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Content source backed by a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this source.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the root.
    ///
    /// A leading `/` still means "relative to the root", matching how the
    /// page itself is mounted under `/app/`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ContentSource for DirSource {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_rooted_paths() {
        let source = DirSource::new("/app");

        assert_eq!(source.resolve("img/logo.png"), PathBuf::from("/app/img/logo.png"));
        assert_eq!(source.resolve("/img/logo.png"), PathBuf::from("/app/img/logo.png"));
    }

    #[test]
    fn test_read_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("img")).unwrap();
        std::fs::write(temp_dir.path().join("img/a.bin"), [1, 2, 3]).unwrap();

        let source = DirSource::new(temp_dir.path());

        assert_eq!(source.read("img/a.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(temp_dir.path());

        let err = source.read("missing.png").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
