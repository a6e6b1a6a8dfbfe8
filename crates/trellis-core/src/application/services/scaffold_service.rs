//! Scaffold Service - creates projects and adds components.
//!
//! This service coordinates the generation workflow:
//! 1. Validate the request against the registry and the filesystem
//! 2. Expand the template for the project or component kind
//! 3. Write the expanded structure
//! 4. Register the result (tracked references in `API.rst` and, for CLIs,
//!    `pyproject.toml`) and persist the registry

use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError, Project,
        ports::{Filesystem, RegistryStore, TemplateExpander, TemplateStore},
        services::mutator::OPS_TARGET,
    },
    domain::{
        ComponentContext, ComponentId, ComponentKind, ComponentRecord, DomainError,
        DomainValidator as validator, FsEntry, ProjectStructure, RelativePath, TemplateId,
        TemplateParameters, WritePolicy,
        entities::layout::{API_REFERENCE_FILE, PYPROJECT_FILE, api_reference, script_entry},
        to_module_name,
    },
    error::TrellisResult,
};

/// Template expanded by `create`.
pub const PROJECT_TEMPLATE: &str = "project";

const SCRIPTS_TABLE: &str = "[project.scripts]";
const API_REFERENCE_HEADER: &str = "API\n===\n";

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub id: String,
    pub description: String,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Overrides the name derived from the project name.
    pub package_name: Option<String>,
    /// Allow creating a project inside another one.
    pub allow_nesting: bool,
    /// Template parameter defaults (author, license, ...).
    pub defaults: TemplateParameters,
}

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Write over untracked files already at the component's location.
    pub overwrite: bool,
    pub defaults: TemplateParameters,
}

/// Project and component generation service.
pub struct ScaffoldService {
    templates: Box<dyn TemplateStore>,
    expander: Box<dyn TemplateExpander>,
    filesystem: Box<dyn Filesystem>,
    store: Box<dyn RegistryStore>,
}

impl ScaffoldService {
    pub fn new(
        templates: Box<dyn TemplateStore>,
        expander: Box<dyn TemplateExpander>,
        filesystem: Box<dyn Filesystem>,
        store: Box<dyn RegistryStore>,
    ) -> Self {
        Self {
            templates,
            expander,
            filesystem,
            store,
        }
    }

    /// Create a project named `project_name` inside `parent_dir`.
    ///
    /// The new project starts from an empty registry, persisted before this
    /// returns.
    #[instrument(
        skip_all,
        fields(project = %project_name, parent = %parent_dir.display())
    )]
    pub fn create_project(
        &self,
        project_name: &str,
        parent_dir: &Path,
        options: &CreateOptions,
    ) -> TrellisResult<Project> {
        validator::validate_project_name(project_name)?;
        let project_name = project_name.trim();
        let package_name = options
            .package_name
            .clone()
            .unwrap_or_else(|| to_module_name(project_name));
        validator::validate_component_name(&package_name).map_err(|e| {
            DomainError::InvalidProjectName {
                name: package_name.clone(),
                reason: format!("package name: {e}"),
            }
        })?;

        let root = parent_dir.join(project_name);
        self.check_project_location(&root, parent_dir, options.allow_nesting)?;

        let template = self.templates.get(&TemplateId::new(PROJECT_TEMPLATE))?;
        validator::validate_template(&template)?;
        let parameters =
            TemplateParameters::for_project(project_name, &package_name).with_defaults(&options.defaults);
        let structure = self.expander.expand(&template, &parameters, &root)?;
        validator::validate_project_structure(&structure)?;

        info!(target: OPS_TARGET, "Creating project '{}' at {}", project_name, root.display());
        let created_root = !self.filesystem.exists(&root);
        if let Err(e) = self.write_structure(&structure, false) {
            warn!("Write failed, attempting rollback");
            if created_root {
                self.rollback(&root);
            }
            return Err(e);
        }

        let mut project = Project::new(root, project_name, package_name);
        project.begin_registry();
        project.save_registry(self.store.as_ref())?;

        info!(files = structure.entry_count(), "Project created");
        Ok(project)
    }

    /// Generate a component and register it.
    #[instrument(skip_all, fields(component = %name, kind = %kind.flag()))]
    pub fn add_component(
        &self,
        project: &mut Project,
        name: &str,
        kind: ComponentKind,
        options: &AddOptions,
    ) -> TrellisResult<ComponentId> {
        if !project.is_registry_loaded() {
            project.load_registry(self.store.as_ref())?;
        }
        let id = ComponentId::parse(name)?;
        validator::validate_new_component(project.registry()?, &id, kind)?;

        let layout = project.layout();
        let source = layout.source_path(&id, kind)?;
        let test = layout.test_path(&id, kind)?;
        if !options.overwrite {
            for path in [&source, &test] {
                if self.filesystem.exists(&project.resolve(path)) {
                    return Err(DomainError::UntrackedPath {
                        path: path.to_string(),
                    }
                    .into());
                }
            }
        }

        let module = layout.module_path(&id, kind);
        let parameters = TemplateParameters::for_project(project.name(), project.package_name())
            .with("component_name", id.name())
            .with("component_path", id.as_str())
            .with("module_path", module.as_str())
            .with_defaults(&options.defaults);

        let template = self.templates.get(&TemplateId::new(kind.template_name()))?;
        validator::validate_template(&template)?;
        let structure = self.expander.expand(&template, &parameters, project.root())?;

        info!(target: OPS_TARGET, "Adding {} '{}' -> '{}'", kind.description(), id, source);
        self.write_structure(&structure, options.overwrite)?;

        let mut context = ComponentContext::new();
        for (key, value) in parameters.iter() {
            context.insert(key.as_str(), value.as_str());
        }
        context.insert(kind.flag(), true);
        let mut record = ComponentRecord::new(kind, context);

        let api = RelativePath::try_new(API_REFERENCE_FILE)?;
        let section = api_reference(&module);
        self.append_api_reference(project, &api, &section)?;
        record.track(api, section)?;

        if kind.is_cli() {
            let entry = script_entry(id.name(), &module);
            let pyproject = RelativePath::try_new(PYPROJECT_FILE)?;
            self.add_script_entry(project, &pyproject, &entry)?;
            record.track(pyproject, entry)?;
        }

        let mut registry = project.registry()?.clone();
        registry.insert(id.clone(), record)?;
        project.set_registry(registry);
        project.save_registry(self.store.as_ref())?;

        info!(component = %id, "Component added");
        Ok(id)
    }

    /// List all available templates.
    pub fn list_templates(&self) -> TrellisResult<Vec<TemplateInfo>> {
        Ok(self
            .templates
            .list()?
            .into_iter()
            .map(|t| TemplateInfo {
                id: t.id.to_string(),
                parameters: t.required_parameters(),
                description: t.description,
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn check_project_location(
        &self,
        root: &Path,
        parent_dir: &Path,
        allow_nesting: bool,
    ) -> TrellisResult<()> {
        if self.filesystem.exists(root) && !self.filesystem.walk(root)?.is_empty() {
            return Err(ApplicationError::ProjectExists {
                path: root.to_path_buf(),
            }
            .into());
        }

        if !allow_nesting {
            let enclosing = parent_dir
                .ancestors()
                .find(|dir| self.filesystem.exists(&dir.join(PYPROJECT_FILE)));
            if let Some(enclosing) = enclosing {
                debug!(enclosing = %enclosing.display(), "Found enclosing project");
                return Err(ApplicationError::NestedProject {
                    path: root.to_path_buf(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Write all entries of the structure, honouring each file's policy.
    fn write_structure(&self, structure: &ProjectStructure, overwrite: bool) -> TrellisResult<()> {
        let root = structure.root();
        self.filesystem.create_dir_all(root)?;

        for entry in &structure.entries {
            let path = root.join(entry.path().as_path());
            match entry {
                FsEntry::Directory(_) => self.filesystem.create_dir_all(&path)?,
                FsEntry::File(file) => {
                    if self.filesystem.exists(&path) {
                        match file.policy {
                            WritePolicy::KeepExisting => {
                                debug!(path = %path.display(), "Keeping existing file");
                                continue;
                            }
                            WritePolicy::CreateNew if !overwrite => {
                                return Err(DomainError::UntrackedPath {
                                    path: file.path.to_string(),
                                }
                                .into());
                            }
                            WritePolicy::CreateNew => {
                                warn!(path = %path.display(), "Overwriting existing file");
                            }
                        }
                    }
                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, &file.content)?;
                }
            }
        }
        Ok(())
    }

    fn append_api_reference(
        &self,
        project: &Project,
        api: &RelativePath,
        section: &str,
    ) -> TrellisResult<()> {
        let path = project.resolve(api);
        let mut text = if self.filesystem.exists(&path) {
            self.filesystem.read_to_string(&path)?
        } else {
            API_REFERENCE_HEADER.to_string()
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(section);
        self.filesystem.write_file(&path, &text)
    }

    fn add_script_entry(
        &self,
        project: &Project,
        pyproject: &RelativePath,
        entry: &str,
    ) -> TrellisResult<()> {
        let path = project.resolve(pyproject);
        if !self.filesystem.exists(&path) {
            return Err(ApplicationError::NotAProject {
                path: project.root().to_path_buf(),
                reason: format!("{PYPROJECT_FILE} is missing"),
            }
            .into());
        }
        let text = self.filesystem.read_to_string(&path)?;
        self.filesystem
            .write_file(&path, &insert_script_entry(&text, entry))
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }
}

/// Add `entry` as the last line of the `[project.scripts]` table, creating
/// the table at the end of the document when absent.
fn insert_script_entry(text: &str, entry: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim() == SCRIPTS_TABLE) else {
        let mut out = text.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("\n{SCRIPTS_TABLE}\n{entry}\n"));
        return out;
    };

    // Insert after the last non-blank line of the table.
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim_start().starts_with('['))
        .map_or(lines.len(), |offset| start + 1 + offset);
    let insert_at = (start + 1..end)
        .rev()
        .find(|&i| !lines[i].trim().is_empty())
        .map_or(start + 1, |i| i + 1);

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..insert_at]);
    out.push(entry);
    out.extend_from_slice(&lines[insert_at..]);
    let mut joined = out.join("\n");
    joined.push('\n');
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_entry_appended_to_existing_table() {
        let text = "[project]\nname = \"BAR\"\n\n[project.scripts]\nfoo = \"bar.cli.foo:main\"\n\n[build-system]\nrequires = []\n";
        let updated = insert_script_entry(text, "app = \"bar.cli.app:main\"");
        assert_eq!(
            updated,
            "[project]\nname = \"BAR\"\n\n[project.scripts]\nfoo = \"bar.cli.foo:main\"\napp = \"bar.cli.app:main\"\n\n[build-system]\nrequires = []\n"
        );
    }

    #[test]
    fn script_table_created_when_missing() {
        let updated = insert_script_entry("[project]\nname = \"BAR\"", "app = \"bar.cli.app:main\"");
        assert_eq!(
            updated,
            "[project]\nname = \"BAR\"\n\n[project.scripts]\napp = \"bar.cli.app:main\"\n"
        );
    }

    #[test]
    fn empty_script_table_gets_first_entry() {
        let updated = insert_script_entry("[project.scripts]\n", "app = \"bar.cli.app:main\"");
        assert_eq!(updated, "[project.scripts]\napp = \"bar.cli.app:main\"\n");
    }
}
