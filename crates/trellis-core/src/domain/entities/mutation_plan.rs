//! Ordered filesystem and registry changes for one rename/move/remove.
//!
//! A plan is computed up front from the registry and the project layout,
//! validated as a whole, and only then executed step by step. Execution is
//! not transactional: a failure halts it after the steps already applied.

use std::collections::BTreeMap;
use std::fmt;

use super::common::RelativePath;
use super::component::ComponentId;
use super::registry::Registry;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub old: String,
    pub new: String,
}

impl Substitution {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Registered components inside a relocated tree, at their new paths.
///
/// Entries below these paths keep their names, and their files only get
/// `rewrite`: they belong to another component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedComponents {
    pub paths: Vec<RelativePath>,
    pub rewrite: Vec<Substitution>,
}

impl NestedComponents {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOperation {
    /// Move a directory, then rename entries under it whose names contain
    /// `rename_entries.old` and rewrite the contents of its text files.
    RelocateTree {
        from: RelativePath,
        to: RelativePath,
        rename_entries: Option<Substitution>,
        rewrite: Vec<Substitution>,
        nested: NestedComponents,
    },
    /// Move a single file and rewrite its contents.
    RelocateFile {
        from: RelativePath,
        to: RelativePath,
        rewrite: Vec<Substitution>,
    },
    /// Replace one tracked literal inside a shared file, optionally renaming
    /// the file afterwards.
    RewriteTracked {
        path: RelativePath,
        old_literal: String,
        new_literal: String,
        rename_to: Option<RelativePath>,
    },
    DeleteFile {
        path: RelativePath,
    },
    DeleteTree {
        path: RelativePath,
    },
}

impl FsOperation {
    /// The two values shown in the operation log line.
    pub fn endpoints(&self) -> (String, String) {
        match self {
            Self::RelocateTree { from, to, .. } | Self::RelocateFile { from, to, .. } => {
                (from.to_string(), to.to_string())
            }
            Self::RewriteTracked {
                old_literal,
                new_literal,
                ..
            } => (
                old_literal.trim().escape_debug().to_string(),
                new_literal.trim().escape_debug().to_string(),
            ),
            Self::DeleteFile { path } | Self::DeleteTree { path } => {
                (path.to_string(), String::new())
            }
        }
    }

    pub fn primary_path(&self) -> &RelativePath {
        match self {
            Self::RelocateTree { from, .. } | Self::RelocateFile { from, .. } => from,
            Self::RewriteTracked { path, .. }
            | Self::DeleteFile { path }
            | Self::DeleteTree { path } => path,
        }
    }
}

/// Whether a missing source path fails the operation or is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    pub verb: &'static str,
    /// What is being touched, e.g. `Python module` or `test tree of Python module`.
    pub subject: String,
    pub operation: FsOperation,
    pub presence: Presence,
}

impl PlannedOperation {
    /// `<verb> <subject> '<old>' -> '<new>'`
    pub fn intent(&self) -> String {
        let (old, new) = self.operation.endpoints();
        format!("{} {} '{}' -> '{}'", self.verb, self.subject, old, new)
    }
}

impl fmt::Display for PlannedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intent())
    }
}

/// A registry entry that changes key. `tracked_files` is the record's
/// complete tracked map after the change.
#[derive(Debug, Clone, PartialEq)]
pub struct Relocation {
    pub from: ComponentId,
    pub to: ComponentId,
    pub tracked_files: BTreeMap<RelativePath, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationPlan {
    pub operations: Vec<PlannedOperation>,
    pub relocations: Vec<Relocation>,
    pub removals: Vec<ComponentId>,
    /// Paths the operation will create; none may exist beforehand.
    pub claimed_paths: Vec<RelativePath>,
}

impl MutationPlan {
    pub fn push(
        &mut self,
        verb: &'static str,
        subject: impl Into<String>,
        operation: FsOperation,
        presence: Presence,
    ) {
        self.operations.push(PlannedOperation {
            verb,
            subject: subject.into(),
            operation,
            presence,
        });
    }

    /// Apply the registry half of the plan: tracked literals, then re-keys,
    /// then removals.
    pub fn apply_to_registry(&self, mut registry: Registry) -> Result<Registry, DomainError> {
        for relocation in &self.relocations {
            let record = registry
                .get_mut(&relocation.from)
                .ok_or_else(|| DomainError::ComponentNotFound {
                    id: relocation.from.to_string(),
                    suggestions: Vec::new(),
                })?;
            record.set_tracked_files(relocation.tracked_files.clone());
        }
        for relocation in &self.relocations {
            registry.rekey(&relocation.from, relocation.to.clone())?;
        }
        for id in &self.removals {
            registry.remove(id)?;
        }
        Ok(registry)
    }
}
