//! Registry persisted as a pretty-printed JSON document in the project root.
//!
//! ```json
//! {
//!   "foo/soup": {
//!     "kind-flags": { "py": true },
//!     "context": { "component_name": "soup", "package_name": "bar" },
//!     "API.rst": "\n.. automodule:: bar.foo.soup\n   :members:\n"
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use trellis_core::{
    application::{ApplicationError, ports::RegistryStore},
    domain::Registry,
    error::TrellisResult,
};

/// File name of the registry document.
pub const REGISTRY_FILE: &str = "trellis.components.json";

/// Production registry store: one JSON document per project.
#[derive(Debug, Clone, Default)]
pub struct JsonRegistryStore {
    file_name: Option<String>,
}

impl JsonRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different document name inside the project root.
    pub fn with_file_name(file_name: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
        }
    }
}

impl RegistryStore for JsonRegistryStore {
    fn location(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.file_name.as_deref().unwrap_or(REGISTRY_FILE))
    }

    fn load(&self, project_root: &Path) -> TrellisResult<Registry> {
        let path = self.location(project_root);
        if !path.exists() {
            debug!(path = %path.display(), "No registry document, starting empty");
            return Ok(Registry::new());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ApplicationError::filesystem("read registry", &path, e))?;
        if content.trim().is_empty() {
            warn!(path = %path.display(), "Registry document is empty");
            return Ok(Registry::new());
        }

        parse(&content).map_err(|reason| {
            ApplicationError::RegistryFormat {
                path: path.clone(),
                reason,
            }
            .into()
        })
    }

    fn save(&self, registry: &Registry, project_root: &Path) -> TrellisResult<()> {
        let path = self.location(project_root);
        let content = render(registry).map_err(|reason| ApplicationError::RegistryFormat {
            path: path.clone(),
            reason,
        })?;
        atomic_write(&path, &content)
    }
}

pub(crate) fn parse(content: &str) -> Result<Registry, String> {
    serde_json::from_str(content).map_err(|e| e.to_string())
}

pub(crate) fn render(registry: &Registry) -> Result<String, String> {
    let mut content = serde_json::to_string_pretty(registry).map_err(|e| e.to_string())?;
    content.push('\n');
    Ok(content)
}

/// Write to a sibling temp file, then rename over the target, so a crash
/// never leaves a truncated registry behind.
fn atomic_write(path: &Path, content: &str) -> TrellisResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| ApplicationError::filesystem("write registry", &tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ApplicationError::filesystem("replace registry", path, e)
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Registry written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trellis_core::{
        domain::{ComponentContext, ComponentId, ComponentKind, ComponentRecord, RelativePath},
        error::TrellisError,
    };

    fn sample() -> Registry {
        let mut registry = Registry::new();
        let mut record = ComponentRecord::new(
            ComponentKind::PythonModule,
            ComponentContext::new()
                .with("component_name", "soup")
                .with("py", true),
        );
        record
            .track(RelativePath::try_new("API.rst").unwrap(), "bar.foo.soup")
            .unwrap();
        registry
            .insert(ComponentId::parse("foo/soup").unwrap(), record)
            .unwrap();
        registry
    }

    #[test]
    fn missing_document_is_empty_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = JsonRegistryStore::new().load(tmp.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = JsonRegistryStore::new();
        store.save(&sample(), tmp.path()).unwrap();

        assert_eq!(store.load(tmp.path()).unwrap(), sample());
        assert!(!tmp.path().join("trellis.components.json.tmp").exists());
    }

    #[test]
    fn document_uses_kind_flags_and_tracked_keys() {
        let text = render(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entry = &value["foo/soup"];
        assert_eq!(entry["kind-flags"]["py"], serde_json::Value::Bool(true));
        assert_eq!(entry["API.rst"], "bar.foo.soup");
        assert_eq!(entry["context"]["component_name"], "soup");
    }

    #[test]
    fn unparsable_document_is_registry_format_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(REGISTRY_FILE), "{ not json").unwrap();

        let err = JsonRegistryStore::new().load(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Application(ApplicationError::RegistryFormat { .. })
        ));
    }

    #[test]
    fn two_kind_flags_are_rejected() {
        let doc = r#"{ "foo": { "kind-flags": { "py": true, "cli": true }, "context": {} } }"#;
        let err = parse(doc).unwrap_err();
        assert!(err.contains("--py"), "{err}");
    }
}
