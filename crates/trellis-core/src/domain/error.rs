// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (the CLI renders them after the operation unwinds)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid component identifier '{id}': {reason}")]
    InvalidComponentId { id: String, reason: String },

    #[error("Invalid component name '{name}': {reason}")]
    InvalidComponentName { name: String, reason: String },

    #[error("'{name}' looks like a path; a rename target must be a bare name")]
    PathLikeName { name: String },

    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("Exactly one component kind must be selected, got: {}", describe_flags(.flags))]
    KindConflict { flags: Vec<String> },

    #[error("Empty destination for '{id}'")]
    EmptyDestination { id: String },

    #[error("Cannot move '{id}' into '{destination}': destination is the component itself or one of its descendants")]
    MoveCycle { id: String, destination: String },

    #[error("Cannot move '{id}' into '{destination}': {reason}")]
    InvalidMoveTarget {
        id: String,
        destination: String,
        reason: String,
    },

    #[error("Cannot add '{id}' under '{parent}': {reason}")]
    InvalidParent {
        id: String,
        parent: String,
        reason: String,
    },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Missing parameter: '{name}' (in {location})")]
    MissingParameter { name: String, location: String },

    #[error("Duplicate path in structure: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("'{path}' cannot be tracked: {reason}")]
    InvalidTrackedPath { path: String, reason: String },

    #[error("Invalid replacement pattern for '{literal}': {reason}")]
    InvalidPattern { literal: String, reason: String },

    // ========================================================================
    // Conflict Errors
    // ========================================================================
    #[error("Component '{id}' already exists")]
    ComponentExists { id: String },

    #[error("'{path}' already exists on disk but is not a registered component")]
    UntrackedPath { path: String },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Component '{id}' not found{}", did_you_mean(.suggestions))]
    ComponentNotFound { id: String, suggestions: Vec<String> },
}

fn describe_flags(flags: &[String]) -> String {
    if flags.is_empty() {
        "none".to_string()
    } else {
        flags
            .iter()
            .map(|f| format!("--{f}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ComponentNotFound { suggestions, .. } if !suggestions.is_empty() => suggestions
                .iter()
                .map(|s| format!("Did you mean '{}'?", s))
                .collect(),
            Self::ComponentNotFound { .. } => vec![
                "Component identifiers are paths relative to the package, e.g. foo/soup".into(),
                "Try: trellis list".into(),
            ],
            Self::ComponentExists { id } => vec![
                format!("'{}' is already registered", id),
                "Pick another name, or remove the existing component first".into(),
            ],
            Self::UntrackedPath { path } => vec![
                format!("Move or delete '{}' first", path),
                "Trellis never overwrites files it does not track".into(),
            ],
            Self::PathLikeName { .. } => vec![
                "To rename, pass only the new name: trellis mv foo/soup onion_soup".into(),
                "To move, pass an existing component: trellis mv foo/soup foo2".into(),
            ],
            Self::EmptyDestination { id } => vec![
                format!("To remove it, omit the destination: trellis mv {}", id),
                format!("To rename it, pass the new name: trellis mv {} <new_name>", id),
            ],
            Self::KindConflict { .. } => vec![
                "Pass exactly one of --py, --package, --f90, --cpp, --cli, --clisub".into(),
            ],
            Self::MoveCycle { .. } => {
                vec!["A component cannot be moved into itself or its own subtree".into()]
            }
            Self::InvalidMoveTarget { .. } | Self::InvalidParent { .. } => vec![
                "Only Python modules and packages can contain other components".into(),
                "CLI components always live in the package's cli directory".into(),
            ],
            Self::InvalidComponentName { .. } | Self::InvalidComponentId { .. } => vec![
                "Names must be valid Python identifiers: letters, digits and underscores".into(),
                "Names cannot start with a digit".into(),
            ],
            Self::MissingParameter { name, .. } => vec![
                format!("Provide a value for '{}' in the template parameters", name),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ComponentNotFound { .. } => ErrorCategory::NotFound,
            Self::ComponentExists { .. } | Self::UntrackedPath { .. } => ErrorCategory::Conflict,
            Self::InvalidPattern { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_suggestions_in_message() {
        let err = DomainError::ComponentNotFound {
            id: "soup".into(),
            suggestions: vec!["foo/soup".into()],
        };
        assert_eq!(
            err.to_string(),
            "Component 'soup' not found (did you mean: foo/soup?)"
        );
        assert_eq!(err.suggestions(), vec!["Did you mean 'foo/soup'?"]);
    }

    #[test]
    fn kind_conflict_lists_flags() {
        let err = DomainError::KindConflict {
            flags: vec!["py".into(), "cli".into()],
        };
        assert!(err.to_string().ends_with("--py, --cli"));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn missing_parameter_names_the_parameter() {
        let err = DomainError::MissingParameter {
            name: "x".into(),
            location: "README.md".into(),
        };
        assert!(err.to_string().starts_with("Missing parameter: 'x'"));
    }
}
