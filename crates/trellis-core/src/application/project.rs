//! Project facade: the project root, its package, and the loaded registry.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::{ApplicationError, ports::RegistryStore};
use crate::domain::{ProjectLayout, Registry, RelativePath};
use crate::error::TrellisResult;

/// An opened project.
///
/// The registry starts out unloaded: [`registry`](Self::registry) fails
/// until [`load_registry`](Self::load_registry) (or, for a brand-new project,
/// [`begin_registry`](Self::begin_registry)) has run.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    name: String,
    layout: ProjectLayout,
    registry: Option<Registry>,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            layout: ProjectLayout::new(package_name),
            registry: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> &str {
        self.layout.package_name()
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Absolute path of a project-relative path.
    pub fn resolve(&self, path: &RelativePath) -> PathBuf {
        self.root.join(path.as_path())
    }

    /// Read the persisted registry, replacing whatever was loaded before.
    pub fn load_registry(&mut self, store: &dyn RegistryStore) -> TrellisResult<&Registry> {
        let registry = store.load(&self.root)?;
        debug!(
            components = registry.len(),
            location = %store.location(&self.root).display(),
            "Registry loaded"
        );
        Ok(self.registry.insert(registry))
    }

    /// Start from an empty registry. Only valid for a project that is being
    /// created and has no persisted registry yet.
    pub fn begin_registry(&mut self) -> &mut Registry {
        self.registry.insert(Registry::new())
    }

    pub fn is_registry_loaded(&self) -> bool {
        self.registry.is_some()
    }

    pub fn registry(&self) -> TrellisResult<&Registry> {
        self.registry
            .as_ref()
            .ok_or_else(|| ApplicationError::RegistryNotLoaded.into())
    }

    pub fn set_registry(&mut self, registry: Registry) {
        self.registry = Some(registry);
    }

    pub fn save_registry(&self, store: &dyn RegistryStore) -> TrellisResult<()> {
        let registry = self.registry()?;
        store.save(registry, &self.root)?;
        debug!(components = registry.len(), "Registry saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockRegistryStore;
    use crate::error::TrellisError;

    #[test]
    fn registry_access_before_load_fails_fast() {
        let project = Project::new("/tmp/BAR", "BAR", "bar");
        assert!(matches!(
            project.registry(),
            Err(TrellisError::Application(ApplicationError::RegistryNotLoaded))
        ));
    }

    #[test]
    fn begin_registry_is_the_empty_start() {
        let mut project = Project::new("/tmp/BAR", "BAR", "bar");
        project.begin_registry();
        assert!(project.registry().unwrap().is_empty());
    }

    #[test]
    fn load_registry_reads_from_store() {
        let mut store = MockRegistryStore::new();
        store.expect_load().times(1).returning(|_| Ok(Registry::new()));
        store
            .expect_location()
            .returning(|root| root.join("components.json"));

        let mut project = Project::new("/tmp/BAR", "BAR", "bar");
        project.load_registry(&store).unwrap();
        assert!(project.is_registry_loaded());
    }
}
