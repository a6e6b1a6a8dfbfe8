use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::{entities::common::RelativePath, error::DomainError};

/// What to do when a file to be written already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// The file must not exist yet.
    #[default]
    CreateNew,
    /// Write only when absent; an existing file is left untouched.
    KeepExisting,
}

/// Rendered template output ready for materialization.
///
/// This is the output of template expansion: every placeholder is already
/// resolved, so writing it cannot fail on a missing parameter.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn add_file(&mut self, path: RelativePath, content: String, policy: WritePolicy) {
        self.entries.push(FsEntry::File(FileToWrite {
            path,
            content,
            policy,
        }));
    }

    pub fn add_directory(&mut self, path: RelativePath) {
        self.entries
            .push(FsEntry::Directory(DirectoryToCreate { path }));
    }

    pub fn with_file(mut self, path: RelativePath, content: impl Into<String>) -> Self {
        self.add_file(path, content.into(), WritePolicy::CreateNew);
        self
    }

    pub fn with_directory(mut self, path: RelativePath) -> Self {
        self.add_directory(path);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entries.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Project structure is empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let path = entry.path();
            if !seen.insert(path) {
                return Err(DomainError::DuplicatePath {
                    path: path.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryToCreate> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::Directory(d) => Some(d),
            _ => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &RelativePath {
        match self {
            FsEntry::File(f) => &f.path,
            FsEntry::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: RelativePath,
    pub content: String,
    pub policy: WritePolicy,
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: RelativePath,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    #[test]
    fn structure_builds_correctly() {
        let structure = ProjectStructure::new("/tmp/BAR")
            .with_directory(rel("bar"))
            .with_file(rel("bar/__init__.py"), "");

        assert_eq!(structure.entry_count(), 2);
        assert_eq!(structure.files().count(), 1);
        assert_eq!(structure.directories().count(), 1);
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn structure_rejects_duplicates() {
        let structure = ProjectStructure::new("/tmp/BAR")
            .with_file(rel("bar/__init__.py"), "")
            .with_file(rel("./bar/__init__.py"), "");
        assert!(matches!(
            structure.validate(),
            Err(DomainError::DuplicatePath { .. })
        ));
    }

    #[test]
    fn empty_structure_is_invalid() {
        assert!(ProjectStructure::new("/tmp/BAR").validate().is_err());
    }
}
