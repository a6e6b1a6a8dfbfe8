//! Component Manager: rename, move and remove registered components.
//!
//! Every operation follows the same shape:
//!
//! 1. classify the request against the loaded registry ([`MvAction`]);
//! 2. plan every filesystem and registry change up front ([`Planner`]);
//! 3. refuse if the plan would land on untracked files;
//! 4. execute the filesystem steps in order, logging each before it runs;
//! 5. apply the registry half of the plan and persist the whole registry.
//!
//! A failure in step 4 stops immediately. Steps already applied stay applied
//! and the registry is not persisted, so the operation log is the record to
//! reconcile from.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError, Project,
        ports::{Filesystem, RegistryStore},
        services::mutator::{FilesystemMutator, MutationReport},
    },
    domain::{
        ComponentContext, ComponentId, ComponentRecord, MutationPlan, MvAction, Planner, Registry,
        ReplaceMode,
    },
    error::TrellisResult,
};

/// A registry value after an operation, with what was done to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct MvOutcome {
    pub registry: Registry,
    pub report: MutationReport,
}

/// Information about a registered component for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInfo {
    pub id: String,
    pub kind: String,
    pub flag: String,
    pub source: String,
    pub test: String,
    pub module: String,
    pub tracked_files: BTreeMap<String, String>,
    pub context: ComponentContext,
}

pub struct ComponentService {
    filesystem: Box<dyn Filesystem>,
    store: Box<dyn RegistryStore>,
    mode: ReplaceMode,
}

impl ComponentService {
    pub fn new(filesystem: Box<dyn Filesystem>, store: Box<dyn RegistryStore>) -> Self {
        Self {
            filesystem,
            store,
            mode: ReplaceMode::default(),
        }
    }

    pub fn with_replace_mode(mut self, mode: ReplaceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Load the registry if needed and decide what `mv` should do.
    pub fn prepare(
        &self,
        project: &mut Project,
        component: &str,
        destination: Option<&str>,
    ) -> TrellisResult<MvAction> {
        self.ensure_loaded(project)?;
        let action = MvAction::decide(project.registry()?, component, destination)?;
        info!(action = %action.describe(), "Resolved mv request");
        Ok(action)
    }

    /// Carry out a prepared action and persist the resulting registry.
    ///
    /// On error the project keeps the registry it had before the call and
    /// nothing is persisted.
    #[instrument(skip_all, fields(component = %action.id()))]
    pub fn execute(&self, project: &mut Project, action: &MvAction) -> TrellisResult<MutationReport> {
        let registry = project.registry()?.clone();
        let outcome = match action {
            MvAction::Remove { id, .. } => self.remove(project, registry, id)?,
            MvAction::Move { id, into, .. } => self.move_into(project, registry, id, into)?,
            MvAction::Rename { id, new_name, .. } => {
                self.rename(project, registry, id, new_name)?
            }
        };

        project.set_registry(outcome.registry);
        project.save_registry(self.store.as_ref())?;
        info!(
            applied = outcome.report.applied.len(),
            skipped = outcome.report.skipped.len(),
            "Completed: {}",
            action.describe()
        );
        Ok(outcome.report)
    }

    /// `mv <component> [<destination>]` without a confirmation step.
    pub fn mv(
        &self,
        project: &mut Project,
        component: &str,
        destination: Option<&str>,
    ) -> TrellisResult<MutationReport> {
        let action = self.prepare(project, component, destination)?;
        self.execute(project, &action)
    }

    pub fn rename(
        &self,
        project: &Project,
        registry: Registry,
        id: &ComponentId,
        new_name: &str,
    ) -> TrellisResult<MvOutcome> {
        let plan = Planner::new(&registry, project.layout(), self.mode).rename(id, new_name)?;
        self.carry_out(project, registry, plan)
    }

    pub fn move_into(
        &self,
        project: &Project,
        registry: Registry,
        id: &ComponentId,
        into: &ComponentId,
    ) -> TrellisResult<MvOutcome> {
        let plan = Planner::new(&registry, project.layout(), self.mode).move_into(id, into)?;
        self.carry_out(project, registry, plan)
    }

    pub fn remove(
        &self,
        project: &Project,
        registry: Registry,
        id: &ComponentId,
    ) -> TrellisResult<MvOutcome> {
        let plan = Planner::new(&registry, project.layout(), self.mode).remove(id)?;
        if plan.removals.len() > 1 {
            warn!(
                component = %id,
                nested = plan.removals.len() - 1,
                "Removing nested components as well"
            );
        }
        self.carry_out(project, registry, plan)
    }

    /// Registered components in identifier order.
    pub fn list(&self, project: &mut Project) -> TrellisResult<Vec<ComponentInfo>> {
        self.ensure_loaded(project)?;
        let registry = project.registry()?;
        registry
            .iter()
            .map(|(id, record)| describe(project, id, record))
            .collect()
    }

    pub fn info(&self, project: &mut Project, component: &str) -> TrellisResult<ComponentInfo> {
        self.ensure_loaded(project)?;
        let registry = project.registry()?;
        let id = ComponentId::parse(component).map_err(|_| registry.not_found(component))?;
        let record = registry.lookup(&id)?;
        describe(project, &id, record)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn ensure_loaded(&self, project: &mut Project) -> TrellisResult<()> {
        if !project.is_registry_loaded() {
            project.load_registry(self.store.as_ref())?;
        }
        Ok(())
    }

    fn carry_out(
        &self,
        project: &Project,
        registry: Registry,
        plan: MutationPlan,
    ) -> TrellisResult<MvOutcome> {
        let mutator = FilesystemMutator::new(self.filesystem.as_ref(), project.root(), self.mode);
        mutator.check_claims(&plan)?;

        let report = mutator.apply(&plan)?;
        let registry = plan.apply_to_registry(registry).map_err(|e| {
            ApplicationError::ValidationFailed(format!(
                "filesystem updated but registry could not follow: {e}"
            ))
        })?;
        Ok(MvOutcome { registry, report })
    }
}

fn describe(
    project: &Project,
    id: &ComponentId,
    record: &ComponentRecord,
) -> TrellisResult<ComponentInfo> {
    let kind = record.kind();
    let layout = project.layout();
    Ok(ComponentInfo {
        id: id.to_string(),
        kind: kind.description().to_string(),
        flag: kind.flag().to_string(),
        source: layout.source_path(id, kind)?.to_string(),
        test: layout.test_path(id, kind)?.to_string(),
        module: layout.module_path(id, kind),
        tracked_files: record
            .tracked_files()
            .iter()
            .map(|(path, literal)| (path.to_string(), literal.clone()))
            .collect(),
        context: record.context().clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::ports::{MockFilesystem, MockRegistryStore};
    use crate::domain::{ComponentKind, DomainError, RelativePath};
    use crate::error::TrellisError;

    fn id(raw: &str) -> ComponentId {
        ComponentId::parse(raw).unwrap()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for (raw, kind, literal) in [
            ("foo", ComponentKind::PythonModule, "bar.foo"),
            ("foo/soup", ComponentKind::PythonModule, "bar.foo.soup"),
            ("foo2", ComponentKind::PythonPackage, "bar.foo2"),
        ] {
            let mut record = ComponentRecord::new(
                kind,
                ComponentContext::new().with("component_name", id(raw).name()),
            );
            record
                .track(RelativePath::try_new("API.rst").unwrap(), literal)
                .unwrap();
            registry.insert(id(raw), record).unwrap();
        }
        registry
    }

    fn store_with(registry: Registry) -> (MockRegistryStore, Arc<Mutex<Vec<Registry>>>) {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&saved);
        let mut store = MockRegistryStore::new();
        store.expect_load().returning(move |_| Ok(registry.clone()));
        store
            .expect_location()
            .returning(|root| root.join("trellis.components.json"));
        store.expect_save().returning(move |registry, _| {
            sink.lock().unwrap().push(registry.clone());
            Ok(())
        });
        (store, saved)
    }

    fn project() -> Project {
        Project::new("/work/BAR", "BAR", "bar")
    }

    /// A filesystem where exactly `present` exists and every mutation succeeds.
    fn filesystem_with(present: &'static [&'static str]) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(move |path: &Path| {
            present
                .iter()
                .any(|p| PathBuf::from("/work/BAR").join(p) == path)
        });
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_rename().returning(|_, _| Ok(()));
        fs.expect_walk().returning(|_| Ok(Vec::new()));
        fs.expect_read_to_string()
            .returning(|_| Ok("bar.foo.soup\n".to_string()));
        fs.expect_write_file().returning(|_, _| Ok(()));
        fs.expect_remove_dir_all().returning(|_| Ok(()));
        fs
    }

    #[test]
    fn unknown_component_touches_nothing() {
        let (store, saved) = store_with(registry());
        let service = ComponentService::new(Box::new(MockFilesystem::new()), Box::new(store));

        let mut project = project();
        let err = service.mv(&mut project, "soup", Some("onion_soup")).unwrap_err();

        match err {
            TrellisError::Domain(DomainError::ComponentNotFound { suggestions, .. }) => {
                assert_eq!(suggestions, vec!["foo/soup".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(saved.lock().unwrap().is_empty());
    }

    #[test]
    fn move_cycle_is_rejected_before_any_mutation() {
        let (store, saved) = store_with(registry());
        let service = ComponentService::new(Box::new(MockFilesystem::new()), Box::new(store));

        let mut project = project();
        let err = service.mv(&mut project, "foo", Some("foo/soup")).unwrap_err();

        assert!(matches!(err, TrellisError::Domain(DomainError::MoveCycle { .. })));
        assert!(saved.lock().unwrap().is_empty());
        assert_eq!(project.registry().unwrap(), &registry());
    }

    #[test]
    fn rename_rekeys_and_persists() {
        let (store, saved) = store_with(registry());
        let fs = filesystem_with(&["bar/foo/soup", "tests/bar/foo/soup", "API.rst"]);
        let service = ComponentService::new(Box::new(fs), Box::new(store));

        let mut project = project();
        let report = service
            .mv(&mut project, "foo/soup", Some("onion_soup"))
            .unwrap();

        assert_eq!(report.applied.len(), 3);
        let registry = project.registry().unwrap();
        assert!(registry.contains(&id("foo/onion_soup")));
        assert!(!registry.contains(&id("foo/soup")));
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry
                .get(&id("foo/onion_soup"))
                .and_then(|r| r.context().text("component_name")),
            Some("onion_soup")
        );
        assert_eq!(saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn untracked_destination_is_refused() {
        let (store, saved) = store_with(registry());
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|path: &Path| {
            path == Path::new("/work/BAR/bar/foo/onion_soup")
        });
        fs.expect_rename().never();
        let service = ComponentService::new(Box::new(fs), Box::new(store));

        let mut project = project();
        let err = service
            .mv(&mut project, "foo/soup", Some("onion_soup"))
            .unwrap_err();

        assert!(matches!(err, TrellisError::Domain(DomainError::UntrackedPath { .. })));
        assert!(saved.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_step_does_not_persist_registry() {
        let (store, saved) = store_with(registry());
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|path: &Path| {
            path == Path::new("/work/BAR/bar/foo/soup") || path == Path::new("/work/BAR/bar/foo")
        });
        fs.expect_rename().returning(|from, _| {
            Err(ApplicationError::filesystem("rename", from, "permission denied").into())
        });
        let service = ComponentService::new(Box::new(fs), Box::new(store));

        let mut project = project();
        let err = service
            .mv(&mut project, "foo/soup", Some("onion_soup"))
            .unwrap_err();

        assert!(err.is_partial_mutation());
        assert!(saved.lock().unwrap().is_empty());
        assert!(project.registry().unwrap().contains(&id("foo/soup")));
    }

    #[test]
    fn remove_drops_subtree() {
        let (store, saved) = store_with(registry());
        let fs = filesystem_with(&["bar/foo", "tests/bar/foo", "API.rst"]);
        let service = ComponentService::new(Box::new(fs), Box::new(store));

        let mut project = project();
        let action = service.prepare(&mut project, "foo", None).unwrap();
        assert!(action.is_destructive());
        service.execute(&mut project, &action).unwrap();

        let saved = saved.lock().unwrap();
        let persisted = saved.last().unwrap();
        assert_eq!(persisted.len(), 1);
        assert!(persisted.contains(&id("foo2")));
    }

    #[test]
    fn info_describes_layout() {
        let (store, _) = store_with(registry());
        let service = ComponentService::new(Box::new(MockFilesystem::new()), Box::new(store));

        let mut project = project();
        let info = service.info(&mut project, "foo/soup").unwrap();
        assert_eq!(info.source, "bar/foo/soup");
        assert_eq!(info.test, "tests/bar/foo/soup");
        assert_eq!(info.module, "bar.foo.soup");
        assert_eq!(info.flag, "py");

        assert_eq!(service.list(&mut project).unwrap().len(), 3);
    }
}
