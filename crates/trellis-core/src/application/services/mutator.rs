//! Filesystem mutator: executes a [`MutationPlan`] one step at a time.
//!
//! Every step is announced with an `info!` line on the `trellis::ops` target
//! *before* it runs, so the operation log records the intended change even
//! when the step itself fails. A failure stops execution; steps already
//! applied stay applied.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::application::{ApplicationError, ports::Filesystem};
use crate::domain::{
    DomainError, FsOperation, MutationPlan, NestedComponents, Presence, RelativePath,
    ReplaceMode, Substitution, entities::layout::is_excluded_dir, is_text_substitutable,
};
use crate::error::TrellisResult;

/// Log target for the durable operation log.
pub const OPS_TARGET: &str = "trellis::ops";

/// What a plan execution did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct FilesystemMutator<'a> {
    filesystem: &'a dyn Filesystem,
    root: &'a Path,
    mode: ReplaceMode,
}

impl<'a> FilesystemMutator<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, root: &'a Path, mode: ReplaceMode) -> Self {
        Self {
            filesystem,
            root,
            mode,
        }
    }

    fn abs(&self, path: &RelativePath) -> PathBuf {
        self.root.join(path.as_path())
    }

    /// Fail if any path the plan will create is already on disk.
    pub fn check_claims(&self, plan: &MutationPlan) -> TrellisResult<()> {
        for claimed in &plan.claimed_paths {
            if self.filesystem.exists(&self.abs(claimed)) {
                return Err(DomainError::UntrackedPath {
                    path: claimed.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn apply(&self, plan: &MutationPlan) -> TrellisResult<MutationReport> {
        let mut report = MutationReport::default();

        for step in &plan.operations {
            let intent = step.intent();
            let source = self.abs(step.operation.primary_path());

            if !self.filesystem.exists(&source) {
                match step.presence {
                    Presence::Required => {
                        info!(target: OPS_TARGET, "{}", intent);
                        return Err(ApplicationError::filesystem(
                            step.verb.to_lowercase(),
                            source,
                            "no such file or directory",
                        )
                        .into());
                    }
                    Presence::Optional => {
                        warn!(path = %source.display(), "Skipping: {}", intent);
                        report.skipped.push(intent);
                        continue;
                    }
                }
            }

            info!(target: OPS_TARGET, "{}", intent);
            self.execute(&step.operation)?;
            report.applied.push(intent);
        }

        Ok(report)
    }

    fn execute(&self, operation: &FsOperation) -> TrellisResult<()> {
        match operation {
            FsOperation::RelocateTree {
                from,
                to,
                rename_entries,
                rewrite,
                nested,
            } => self.rename_tree(
                &self.abs(from),
                &self.abs(to),
                rename_entries.as_ref(),
                rewrite,
                nested,
            ),
            FsOperation::RelocateFile { from, to, rewrite } => {
                self.rename_file(&self.abs(from), &self.abs(to), rewrite)
            }
            FsOperation::RewriteTracked {
                path,
                old_literal,
                new_literal,
                rename_to,
            } => {
                let path = self.abs(path);
                let count =
                    self.replace_in_file(&path, &[Substitution::new(old_literal, new_literal)])?;
                if count == 0 {
                    debug!(path = %path.display(), literal = %old_literal, "Literal not present");
                }
                if let Some(rename_to) = rename_to {
                    self.filesystem.rename(&path, &self.abs(rename_to))?;
                }
                Ok(())
            }
            FsOperation::DeleteFile { path } => self.delete_file(&self.abs(path)),
            FsOperation::DeleteTree { path } => self.delete_tree(&self.abs(path)),
        }
    }

    /// Move a file and rewrite its contents.
    pub fn rename_file(
        &self,
        from: &Path,
        to: &Path,
        rewrite: &[Substitution],
    ) -> TrellisResult<()> {
        self.ensure_parent(to)?;
        self.filesystem.rename(from, to)?;
        if is_text_substitutable(Path::new(to.file_name().unwrap_or_default())) {
            self.replace_in_file(to, rewrite)?;
        }
        Ok(())
    }

    /// Move a directory, rename descendants whose names contain
    /// `rename_entries.old`, then rewrite text file contents below it.
    ///
    /// Entries under `nested` paths are never renamed and their files only
    /// get `nested.rewrite`.
    pub fn rename_tree(
        &self,
        from: &Path,
        to: &Path,
        rename_entries: Option<&Substitution>,
        rewrite: &[Substitution],
        nested: &NestedComponents,
    ) -> TrellisResult<()> {
        self.ensure_parent(to)?;
        self.filesystem.rename(from, to)?;

        let nested_roots: Vec<PathBuf> = nested.paths.iter().map(|p| self.abs(p)).collect();
        let is_nested = |path: &Path| nested_roots.iter().any(|root| path.starts_with(root));

        if let Some(sub) = rename_entries {
            self.rename_descendants(to, sub, &is_nested)?;
        }

        if rewrite.is_empty() && nested.rewrite.is_empty() {
            return Ok(());
        }
        for node in self.filesystem.walk(to)? {
            if node.is_dir {
                continue;
            }
            let substitutions = if is_nested(&node.path) {
                nested.rewrite.as_slice()
            } else {
                rewrite
            };
            if substitutions.is_empty() {
                continue;
            }
            let relative = node.path.strip_prefix(to).unwrap_or(&node.path);
            if !is_text_substitutable(relative) {
                debug!(path = %node.path.display(), "Not rewriting excluded file");
                continue;
            }
            // Undetected binaries fail to decode; they are not ours to edit.
            match self.filesystem.read_to_string(&node.path) {
                Ok(text) => {
                    self.rewrite_contents(&node.path, text, substitutions)?;
                }
                Err(e) => warn!(path = %node.path.display(), error = %e, "Skipping unreadable file"),
            }
        }
        Ok(())
    }

    fn rename_descendants(
        &self,
        root: &Path,
        sub: &Substitution,
        is_nested: &dyn Fn(&Path) -> bool,
    ) -> TrellisResult<()> {
        let mut nodes: Vec<PathBuf> = self
            .filesystem
            .walk(root)?
            .into_iter()
            .map(|node| node.path)
            .filter(|path| !is_nested(path))
            .filter(|path| {
                let relative = path.strip_prefix(root).unwrap_or(path);
                !relative
                    .components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .any(is_excluded_dir)
            })
            .collect();
        // Children before parents so collected paths stay valid.
        nodes.sort_by_key(|path| std::cmp::Reverse(path.components().count()));

        for path in nodes {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let replaced = self
                .mode
                .replace_literal_occurrences(name, &sub.old, &sub.new)?;
            if replaced.changed() {
                let target = path.with_file_name(&*replaced.text);
                debug!(from = %path.display(), to = %target.display(), "Renaming entry");
                self.filesystem.rename(&path, &target)?;
            }
        }
        Ok(())
    }

    /// Apply `substitutions` in order to the contents of `path`. Returns the
    /// total number of replaced occurrences; the file is only written when
    /// something changed.
    pub fn replace_in_file(
        &self,
        path: &Path,
        substitutions: &[Substitution],
    ) -> TrellisResult<usize> {
        let text = self.filesystem.read_to_string(path)?;
        self.rewrite_contents(path, text, substitutions)
    }

    fn rewrite_contents(
        &self,
        path: &Path,
        mut text: String,
        substitutions: &[Substitution],
    ) -> TrellisResult<usize> {
        let mut total = 0;
        for sub in substitutions {
            let replaced = self
                .mode
                .replace_literal_occurrences(&text, &sub.old, &sub.new)?;
            total += replaced.count;
            text = replaced.text.into_owned();
        }
        if total > 0 {
            self.filesystem.write_file(path, &text)?;
        }
        Ok(total)
    }

    pub fn delete_file(&self, path: &Path) -> TrellisResult<()> {
        self.filesystem.remove_file(path)
    }

    pub fn delete_tree(&self, path: &Path) -> TrellisResult<()> {
        self.filesystem.remove_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> TrellisResult<()> {
        match path.parent() {
            Some(parent) if !self.filesystem.exists(parent) => {
                self.filesystem.create_dir_all(parent)
            }
            _ => Ok(()),
        }
    }
}
