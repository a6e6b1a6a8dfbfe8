//! In-memory template store with built-in templates.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::debug;
use trellis_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainValidator as validator, Template, TemplateId},
    error::TrellisResult,
};

use crate::{builtin_templates, template_loader::FilesystemTemplateLoader};

/// Thread-safe in-memory template store.
///
/// Templates are keyed by id; inserting a template with an existing id
/// replaces it, which is how a user template directory overrides builtins.
#[derive(Debug, Clone)]
pub struct InMemoryTemplateStore {
    inner: Arc<RwLock<BTreeMap<TemplateId, Template>>>,
}

impl InMemoryTemplateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a store with built-in templates loaded.
    pub fn with_builtin() -> TrellisResult<Self> {
        let store = Self::new();
        for template in builtin_templates::all_templates() {
            store.insert(template)?;
        }
        Ok(store)
    }

    /// Load every template under `dir`, replacing builtins with the same id.
    /// Returns the number of templates loaded.
    pub fn load_directory(&self, dir: &Path) -> TrellisResult<usize> {
        let templates = FilesystemTemplateLoader::new(dir).load_all()?;
        let count = templates.len();
        for template in templates {
            debug!(template = %template.id, dir = %dir.display(), "loaded user template");
            self.insert(template)?;
        }
        Ok(count)
    }

    pub fn insert(&self, template: Template) -> TrellisResult<()> {
        validator::validate_template(&template)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(template.id.clone(), template);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn get(&self, id: &TemplateId) -> TrellisResult<Template> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> TrellisResult<Vec<Template>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{domain::ComponentKind, error::TrellisError};

    #[test]
    fn builtin_store_has_every_kind() {
        let store = InMemoryTemplateStore::with_builtin().unwrap();
        for kind in ComponentKind::ALL {
            let template = store.get(&TemplateId::new(kind.template_name())).unwrap();
            assert_eq!(template.id.name(), kind.template_name());
        }
        assert!(store.get(&TemplateId::new("project")).is_ok());
    }

    #[test]
    fn missing_template_is_not_found() {
        let store = InMemoryTemplateStore::new();
        let err = store.get(&TemplateId::new("module-rs")).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn insert_replaces_same_id() {
        let store = InMemoryTemplateStore::with_builtin().unwrap();
        let before = store.len();
        store
            .insert(Template::new("module-py", "custom").with_file("x.py", "pass\n"))
            .unwrap();
        assert_eq!(store.len(), before);
        assert_eq!(
            store.get(&TemplateId::new("module-py")).unwrap().description,
            "custom"
        );
    }

    #[test]
    fn empty_template_is_rejected() {
        let store = InMemoryTemplateStore::new();
        assert!(store.insert(Template::new("empty", "nothing")).is_err());
        assert!(store.is_empty());
    }
}
