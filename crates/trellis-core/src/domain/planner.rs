//! Turns a rename, move or removal into a [`MutationPlan`].
//!
//! Planning is pure: it reads the registry and the layout, validates every
//! precondition, and describes the filesystem and registry changes in the
//! order they must be applied. Nothing is touched until the plan is complete.

use std::collections::BTreeMap;

use crate::domain::entities::{
    ComponentId, ComponentRecord, FsOperation, MutationPlan, NestedComponents, Presence,
    ProjectLayout, Registry, Relocation, RelativePath, Substitution,
};
use crate::domain::error::DomainError;
use crate::domain::replace::ReplaceMode;
use crate::domain::validation::DomainValidator;
use crate::domain::value_objects::{ComponentKind, ComponentLayout};

pub struct Planner<'a> {
    registry: &'a Registry,
    layout: &'a ProjectLayout,
    mode: ReplaceMode,
}

impl<'a> Planner<'a> {
    pub fn new(registry: &'a Registry, layout: &'a ProjectLayout, mode: ReplaceMode) -> Self {
        Self {
            registry,
            layout,
            mode,
        }
    }

    /// Rename `id` to `new_name` within its current namespace.
    ///
    /// Only the component's own entries are renamed. Registered descendants
    /// keep their names and just follow the new module path.
    pub fn rename(&self, id: &ComponentId, new_name: &str) -> Result<MutationPlan, DomainError> {
        DomainValidator::validate_rename(self.registry, id, new_name)?;
        let kind = self.registry.lookup(id)?.kind();
        let new_id = id.with_name(new_name);
        let name_sub = Substitution::new(id.name(), new_name);
        let prefix_sub = Substitution::new(
            format!("{}.", self.layout.module_path(id, kind)),
            format!("{}.", self.layout.module_path(&new_id, kind)),
        );

        let mut nested = NestedComponents {
            paths: Vec::new(),
            rewrite: vec![prefix_sub.clone()],
        };
        for member in self.registry.subtree(id).iter().filter(|m| *m != id) {
            let member_kind = self.registry.lookup(member)?.kind();
            let to = member.rebased(id, &new_id).unwrap_or_else(|| member.clone());
            nested.paths.push(self.layout.source_path(&to, member_kind)?);
            nested.paths.push(self.layout.test_path(&to, member_kind)?);
        }

        let mut plan = MutationPlan::default();
        self.push_relocation(
            &mut plan,
            "Renaming",
            id,
            &new_id,
            kind,
            Some(name_sub.clone()),
            vec![name_sub.clone()],
            nested,
        )?;

        for member in self.registry.subtree(id) {
            let record = self.registry.lookup(&member)?;
            let own = &member == id;
            let substitution = if own { &name_sub } else { &prefix_sub };
            let to = member.rebased(id, &new_id).unwrap_or_else(|| member.clone());
            let tracked =
                self.plan_tracked_rewrites(&mut plan, &member, &to, record, substitution, own)?;
            plan.relocations.push(Relocation {
                from: member,
                to,
                tracked_files: tracked,
            });
        }
        Ok(plan)
    }

    /// Move `id` (and its subtree) under the registered component `into`.
    pub fn move_into(
        &self,
        id: &ComponentId,
        into: &ComponentId,
    ) -> Result<MutationPlan, DomainError> {
        DomainValidator::validate_move(self.registry, id, into)?;
        let kind = self.registry.lookup(id)?.kind();
        let new_id = into.child(id.name());
        let module_sub = Substitution::new(
            self.layout.module_path(id, kind),
            self.layout.module_path(&new_id, kind),
        );

        let mut plan = MutationPlan::default();
        self.push_relocation(
            &mut plan,
            "Moving",
            id,
            &new_id,
            kind,
            None,
            vec![module_sub.clone()],
            NestedComponents::default(),
        )?;

        for member in self.registry.subtree(id) {
            let record = self.registry.lookup(&member)?;
            let to = member.rebased(id, &new_id).unwrap_or_else(|| member.clone());
            let tracked =
                self.plan_tracked_rewrites(&mut plan, &member, &to, record, &module_sub, false)?;
            plan.relocations.push(Relocation {
                from: member,
                to,
                tracked_files: tracked,
            });
        }
        Ok(plan)
    }

    /// Remove `id` and its subtree: delete source and test trees, strip
    /// tracked literals, drop registry entries.
    pub fn remove(&self, id: &ComponentId) -> Result<MutationPlan, DomainError> {
        let kind = self.registry.lookup(id)?.kind();
        let members = self.registry.subtree(id);

        let mut plan = MutationPlan::default();

        let source = self.layout.source_path(id, kind)?;
        let test = self.layout.test_path(id, kind)?;
        match kind.layout() {
            ComponentLayout::TreeLike => {
                plan.push(
                    "Removing",
                    kind.description(),
                    FsOperation::DeleteTree { path: source },
                    Presence::Optional,
                );
                plan.push(
                    "Removing",
                    format!("test tree of {}", kind.description()),
                    FsOperation::DeleteTree { path: test },
                    Presence::Optional,
                );
            }
            ComponentLayout::CliLike => {
                plan.push(
                    "Removing",
                    kind.description(),
                    FsOperation::DeleteFile { path: source },
                    Presence::Optional,
                );
                plan.push(
                    "Removing",
                    format!("test file of {}", kind.description()),
                    FsOperation::DeleteFile { path: test },
                    Presence::Optional,
                );
            }
        }

        // Deepest first, so a parent's literal never clips a child's.
        for member in members.iter().rev() {
            let record = self.registry.lookup(member)?;
            for (path, literal) in record.tracked_files() {
                plan.push(
                    "Removing",
                    format!("reference in {}", path),
                    FsOperation::RewriteTracked {
                        path: path.clone(),
                        old_literal: literal.clone(),
                        new_literal: String::new(),
                        rename_to: None,
                    },
                    Presence::Optional,
                );
            }
        }

        plan.removals = members;
        Ok(plan)
    }

    /// Structural half of a rename or move: the primary tree/file and its
    /// test mirror.
    #[allow(clippy::too_many_arguments)]
    fn push_relocation(
        &self,
        plan: &mut MutationPlan,
        verb: &'static str,
        id: &ComponentId,
        new_id: &ComponentId,
        kind: ComponentKind,
        rename_entries: Option<Substitution>,
        rewrite: Vec<Substitution>,
        nested: NestedComponents,
    ) -> Result<(), DomainError> {
        let source = self.layout.source_path(id, kind)?;
        let new_source = self.layout.source_path(new_id, kind)?;
        let test = self.layout.test_path(id, kind)?;
        let new_test = self.layout.test_path(new_id, kind)?;
        plan.claimed_paths = vec![new_source.clone(), new_test.clone()];

        match kind.layout() {
            ComponentLayout::TreeLike => {
                plan.push(
                    verb,
                    kind.description(),
                    FsOperation::RelocateTree {
                        from: source,
                        to: new_source,
                        rename_entries: rename_entries.clone(),
                        rewrite: rewrite.clone(),
                        nested: nested.clone(),
                    },
                    Presence::Required,
                );
                plan.push(
                    verb,
                    format!("test tree of {}", kind.description()),
                    FsOperation::RelocateTree {
                        from: test,
                        to: new_test,
                        rename_entries,
                        rewrite,
                        nested,
                    },
                    Presence::Optional,
                );
            }
            ComponentLayout::CliLike => {
                plan.push(
                    verb,
                    kind.description(),
                    FsOperation::RelocateFile {
                        from: source,
                        to: new_source,
                        rewrite: rewrite.clone(),
                    },
                    Presence::Required,
                );
                plan.push(
                    verb,
                    format!("test file of {}", kind.description()),
                    FsOperation::RelocateFile {
                        from: test,
                        to: new_test,
                        rewrite,
                    },
                    Presence::Optional,
                );
            }
        }
        Ok(())
    }

    /// Queue rewrites of one record's tracked literals and return its new
    /// tracked map.
    ///
    /// Literals trellis generated itself are regenerated for `to`; anything
    /// else goes through `substitution`.
    fn plan_tracked_rewrites(
        &self,
        plan: &mut MutationPlan,
        from: &ComponentId,
        to: &ComponentId,
        record: &ComponentRecord,
        substitution: &Substitution,
        rename_files: bool,
    ) -> Result<BTreeMap<RelativePath, String>, DomainError> {
        let kind = record.kind();
        let mut tracked = BTreeMap::new();
        for (path, literal) in record.tracked_files() {
            let generated = self
                .layout
                .tracked_literal(path, from, kind)
                .filter(|old| old == literal)
                .and_then(|_| self.layout.tracked_literal(path, to, kind));

            let (new_literal, rename_to) = match generated {
                Some(new_literal) => (new_literal, None),
                None => self.substitute_tracked(path, literal, substitution, rename_files)?,
            };

            if &new_literal != literal || rename_to.is_some() {
                plan.push(
                    "Updating",
                    format!("reference in {}", path),
                    FsOperation::RewriteTracked {
                        path: path.clone(),
                        old_literal: literal.clone(),
                        new_literal: new_literal.clone(),
                        rename_to: rename_to.clone(),
                    },
                    Presence::Optional,
                );
            }
            tracked.insert(rename_to.unwrap_or_else(|| path.clone()), new_literal);
        }
        Ok(tracked)
    }

    fn substitute_tracked(
        &self,
        path: &RelativePath,
        literal: &str,
        substitution: &Substitution,
        rename_files: bool,
    ) -> Result<(String, Option<RelativePath>), DomainError> {
        let new_literal = self
            .mode
            .replace_literal_occurrences(literal, &substitution.old, &substitution.new)?
            .text
            .into_owned();

        if !rename_files {
            return Ok((new_literal, None));
        }
        let replaced = self.mode.replace_literal_occurrences(
            path.file_name(),
            &substitution.old,
            &substitution.new,
        )?;
        let rename_to = if replaced.changed() {
            Some(path.with_file_name(&replaced.text)?)
        } else {
            None
        };
        Ok((new_literal, rename_to))
    }
}
