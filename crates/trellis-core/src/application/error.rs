//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A filesystem operation failed. Earlier steps of the running operation
    /// are not rolled back.
    #[error("Failed to {operation} {}: {reason}", path.display())]
    Filesystem {
        operation: String,
        path: PathBuf,
        reason: String,
    },

    /// The persisted registry exists but could not be parsed.
    #[error("Component registry at {} is malformed: {reason}", path.display())]
    RegistryFormat { path: PathBuf, reason: String },

    /// A registry operation was attempted before the registry was loaded.
    #[error("Component registry has not been loaded for this project")]
    RegistryNotLoaded,

    /// The directory is not a Trellis-managed project.
    #[error("{} is not a project: {reason}", path.display())]
    NotAProject { path: PathBuf, reason: String },

    /// Project already exists at target location.
    #[error("Project already exists at {}", path.display())]
    ProjectExists { path: PathBuf },

    /// A new project was requested inside an existing one.
    #[error("{} is inside an existing project", path.display())]
    NestedProject { path: PathBuf },

    /// Template lookup failed.
    #[error("Template '{id}' not found")]
    TemplateNotFound { id: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Store lock poisoned")]
    StoreLockError,

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Shorthand used by the filesystem adapters.
    pub fn filesystem(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl ToString,
    ) -> Self {
        Self::Filesystem {
            operation: operation.into(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check file permissions and that no other process holds the file".into(),
                "Earlier steps of this operation were not undone; inspect the project tree".into(),
            ],
            Self::RegistryFormat { path, .. } => vec![
                format!("Inspect or restore {}", path.display()),
                "The registry is plain JSON; a version-control checkout usually repairs it".into(),
            ],
            Self::RegistryNotLoaded => vec![
                "Load the project's registry before operating on components".into(),
            ],
            Self::NotAProject { path, .. } => vec![
                format!("No pyproject.toml with a matching top-level package in {}", path.display()),
                "Pass the project directory with --project-path".into(),
                "Or create one with: trellis create <name>".into(),
            ],
            Self::ProjectExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Choose a different project name".into(),
            ],
            Self::NestedProject { .. } => vec![
                "Create the project outside the existing one".into(),
                "Or pass --allow-nesting if this is intentional".into(),
            ],
            Self::TemplateNotFound { .. } => vec![
                "Check the template directory configured in templates.dir".into(),
            ],
            Self::StoreLockError => vec![
                "An internal store is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Filesystem { .. } => ErrorCategory::Io,
            Self::RegistryFormat { .. } => ErrorCategory::Configuration,
            Self::NotAProject { .. } | Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::ProjectExists { .. } | Self::NestedProject { .. } => ErrorCategory::Conflict,
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::RegistryNotLoaded | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
