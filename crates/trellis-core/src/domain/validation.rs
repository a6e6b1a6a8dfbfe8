use crate::domain::{
    entities::{ComponentId, ProjectStructure, Registry, Template, layout::CLI_DIR},
    error::DomainError,
    value_objects::ComponentKind,
};

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// A single component name: a Python identifier that is not a keyword.
    pub fn validate_component_name(name: &str) -> Result<(), DomainError> {
        if name.contains('/') || name.contains('\\') {
            return Err(DomainError::PathLikeName {
                name: name.to_string(),
            });
        }

        let invalid = |reason: &str| DomainError::InvalidComponentName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(invalid("name is empty")),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(invalid("must start with a letter or underscore"));
            }
            _ => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("only letters, digits and underscores are allowed"));
        }
        if PYTHON_KEYWORDS.contains(&name) {
            return Err(invalid("is a Python keyword"));
        }
        Ok(())
    }

    /// Every segment of a new identifier must be a valid name.
    pub fn validate_component_id(id: &ComponentId) -> Result<(), DomainError> {
        for segment in id.segments() {
            Self::validate_component_name(segment).map_err(|e| match e {
                DomainError::InvalidComponentName { reason, .. } => {
                    DomainError::InvalidComponentId {
                        id: id.to_string(),
                        reason: format!("segment '{}' {}", segment, reason),
                    }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(invalid("name is empty"));
        }
        if trimmed.starts_with('.') {
            return Err(invalid("must not start with '.'"));
        }
        if trimmed.contains(['/', '\\']) {
            return Err(invalid("must not contain path separators"));
        }
        if !trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("must contain at least one letter or digit"));
        }
        Ok(())
    }

    /// Where a new component of `kind` may be registered as `id`.
    pub fn validate_new_component(
        registry: &Registry,
        id: &ComponentId,
        kind: ComponentKind,
    ) -> Result<(), DomainError> {
        Self::validate_component_id(id)?;
        Self::check_reserved(id, kind)?;
        if registry.contains(id) {
            return Err(DomainError::ComponentExists { id: id.to_string() });
        }

        if kind.is_cli() {
            if let Some(parent) = id.parent() {
                return Err(DomainError::InvalidParent {
                    id: id.to_string(),
                    parent: parent.to_string(),
                    reason: "CLI components cannot be nested".into(),
                });
            }
            return Ok(());
        }

        if let Some(parent) = id.parent() {
            let record = registry.get(&parent).ok_or_else(|| registry.not_found(parent.as_str()))?;
            if !record.kind().can_contain_components() {
                return Err(DomainError::InvalidParent {
                    id: id.to_string(),
                    parent: parent.to_string(),
                    reason: format!("a {} cannot contain components", record.kind()),
                });
            }
        }
        Ok(())
    }

    /// Moving `id` into the registered component `destination`.
    pub fn validate_move(
        registry: &Registry,
        id: &ComponentId,
        destination: &ComponentId,
    ) -> Result<(), DomainError> {
        let source = registry.lookup(id)?;
        let target = registry.lookup(destination)?;

        if destination.is_within(id) {
            return Err(DomainError::MoveCycle {
                id: id.to_string(),
                destination: destination.to_string(),
            });
        }

        let invalid = |reason: String| DomainError::InvalidMoveTarget {
            id: id.to_string(),
            destination: destination.to_string(),
            reason,
        };
        if source.kind().is_cli() {
            return Err(invalid("CLI components cannot be nested".into()));
        }
        if !target.kind().can_contain_components() {
            return Err(invalid(format!(
                "a {} cannot contain components",
                target.kind()
            )));
        }
        if id.parent().as_ref() == Some(destination) {
            return Err(invalid(format!("'{}' is already inside it", id)));
        }

        let new_id = destination.child(id.name());
        if registry.contains(&new_id) {
            return Err(DomainError::ComponentExists {
                id: new_id.to_string(),
            });
        }
        Ok(())
    }

    /// Renaming `id` to the bare name `new_name` within its namespace.
    pub fn validate_rename(
        registry: &Registry,
        id: &ComponentId,
        new_name: &str,
    ) -> Result<(), DomainError> {
        let kind = registry.lookup(id)?.kind();
        Self::validate_component_name(new_name)?;
        Self::check_reserved(&id.with_name(new_name), kind)?;
        if new_name == id.name() {
            return Err(DomainError::InvalidComponentName {
                name: new_name.to_string(),
                reason: "is already the component's name".into(),
            });
        }
        let new_id = id.with_name(new_name);
        if registry.contains(&new_id) {
            return Err(DomainError::ComponentExists {
                id: new_id.to_string(),
            });
        }
        Ok(())
    }

    /// The package's `cli` directory holds every CLI component, so no
    /// top-level tree-like component may take its name.
    fn check_reserved(id: &ComponentId, kind: ComponentKind) -> Result<(), DomainError> {
        if !kind.is_cli() && id.parent().is_none() && id.name() == CLI_DIR {
            return Err(DomainError::InvalidComponentName {
                name: id.name().to_string(),
                reason: "is reserved for the directory of CLI components".into(),
            });
        }
        Ok(())
    }

    pub fn validate_template(template: &Template) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }
}
