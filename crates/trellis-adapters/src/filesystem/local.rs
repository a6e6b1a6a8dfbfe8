//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use tracing::trace;
use trellis_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, FsNode},
    },
    error::{TrellisError, TrellisResult},
};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> TrellisResult<()> {
        trace!(path = %path.display(), bytes = content.len(), "write");
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> TrellisResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        trace!(from = %from.display(), to = %to.display(), "rename");
        if to.exists() {
            // std::fs::rename silently replaces files on unix
            return Err(map_io_error(
                to,
                io::Error::from(io::ErrorKind::AlreadyExists),
                "rename onto",
            ));
        }
        std::fs::rename(from, to).map_err(|e| map_io_error(from, e, "rename"))
    }

    fn remove_file(&self, path: &Path) -> TrellisResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk(&self, root: &Path) -> TrellisResult<Vec<FsNode>> {
        let mut nodes = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ApplicationError::filesystem("walk", path, e)
            })?;
            nodes.push(FsNode {
                path: entry.path().to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(nodes)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> TrellisError {
    ApplicationError::filesystem(operation, path, e).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn walk_lists_parents_before_children() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.create_dir_all(&tmp.path().join("foo/soup")).unwrap();
        fs.write_file(&tmp.path().join("foo/soup/__init__.py"), "")
            .unwrap();

        let nodes = fs.walk(tmp.path()).unwrap();
        let relative: Vec<_> = nodes
            .iter()
            .map(|n| n.path.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                Path::new("foo").to_path_buf(),
                Path::new("foo/soup").to_path_buf(),
                Path::new("foo/soup/__init__.py").to_path_buf(),
            ]
        );
        assert!(nodes[0].is_dir);
        assert!(!nodes[2].is_dir);
    }

    #[test]
    fn rename_refuses_to_clobber() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let a = tmp.path().join("a.py");
        let b = tmp.path().join("b.py");
        fs.write_file(&a, "a").unwrap();
        fs.write_file(&b, "b").unwrap();

        let err = fs.rename(&a, &b).unwrap_err();
        assert!(err.is_partial_mutation());
        assert_eq!(fs.read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn missing_file_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .remove_file(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Application(ApplicationError::Filesystem { .. })
        ));
    }
}
