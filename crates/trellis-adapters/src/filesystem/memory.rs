//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use trellis_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, FsNode},
    },
    error::TrellisResult,
};

/// In-memory filesystem for testing.
///
/// Clones share the same tree, so a test can keep a handle while a service
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// List all files.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if inner.files.contains_key(path) {
            return Err(ApplicationError::filesystem("create directory", path, "is a file").into());
        }
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if !inner.parent_exists(path) {
            return Err(ApplicationError::filesystem(
                "write file",
                path,
                "parent directory does not exist",
            )
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> TrellisResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::filesystem("read file", path, "no such file").into()
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if !inner.exists(from) {
            return Err(ApplicationError::filesystem("rename", from, "no such file or directory").into());
        }
        if inner.exists(to) {
            return Err(ApplicationError::filesystem("rename onto", to, "already exists").into());
        }
        if !inner.parent_exists(to) {
            return Err(ApplicationError::filesystem(
                "rename",
                from,
                format!("parent of {} does not exist", to.display()),
            )
            .into());
        }

        let moved_files: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved_files {
            if let Some(content) = inner.files.remove(&old) {
                inner.files.insert(rebase(&old, from, to), content);
            }
        }

        let moved_dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved_dirs {
            inner.directories.remove(&old);
            inner.directories.insert(rebase(&old, from, to));
        }

        Ok(())
    }

    fn remove_file(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ApplicationError::filesystem("remove file", path, "no such file").into())
    }

    fn remove_dir_all(&self, path: &Path) -> TrellisResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if !inner.directories.contains(path) {
            return Err(
                ApplicationError::filesystem("remove directory", path, "no such directory").into(),
            );
        }
        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.exists(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn walk(&self, root: &Path) -> TrellisResult<Vec<FsNode>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Path ordering is component-wise, so parents sort before children.
        let mut nodes: BTreeMap<&PathBuf, bool> = BTreeMap::new();
        for dir in inner.directories.iter().filter(|p| p.starts_with(root) && *p != root) {
            nodes.insert(dir, true);
        }
        for file in inner.files.keys().filter(|p| p.starts_with(root)) {
            nodes.insert(file, false);
        }

        Ok(nodes
            .into_iter()
            .map(|(path, is_dir)| FsNode {
                path: path.clone(),
                is_dir,
            })
            .collect())
    }
}

fn rebase(path: &Path, from: &Path, to: &Path) -> PathBuf {
    match path.strip_prefix(from) {
        Ok(rest) if rest.as_os_str().is_empty() => to.to_path_buf(),
        Ok(rest) => to.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
