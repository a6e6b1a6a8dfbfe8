//! In-memory registry store for testing.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use trellis_core::{
    application::{ApplicationError, ports::RegistryStore},
    domain::Registry,
    error::TrellisResult,
};

use super::json::{REGISTRY_FILE, parse, render};

/// Thread-safe in-memory registry store.
///
/// Documents are kept in their serialized form, so a save/load cycle goes
/// through the same encoding as [`JsonRegistryStore`](super::JsonRegistryStore).
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistryStore {
    documents: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw persisted document of a project (testing helper).
    pub fn document(&self, project_root: &Path) -> Option<String> {
        self.documents
            .read()
            .ok()?
            .get(&self.location(project_root))
            .cloned()
    }

    /// Number of projects with a persisted document.
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn location(&self, project_root: &Path) -> PathBuf {
        project_root.join(REGISTRY_FILE)
    }

    fn load(&self, project_root: &Path) -> TrellisResult<Registry> {
        let path = self.location(project_root);
        let documents = self
            .documents
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        match documents.get(&path) {
            None => Ok(Registry::new()),
            Some(content) => parse(content)
                .map_err(|reason| ApplicationError::RegistryFormat { path, reason }.into()),
        }
    }

    fn save(&self, registry: &Registry, project_root: &Path) -> TrellisResult<()> {
        let path = self.location(project_root);
        let content = render(registry).map_err(|reason| ApplicationError::RegistryFormat {
            path: path.clone(),
            reason,
        })?;
        self.documents
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?
            .insert(path, content);
        Ok(())
    }
}
