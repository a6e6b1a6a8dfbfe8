//! Unified error handling for Trellis Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Trellis Core operations.
///
/// This enum wraps all possible errors that can occur when using trellis-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum TrellisError {
    /// Errors from the domain layer (business rule violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O and orchestration failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl TrellisError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Conflict => ErrorCategory::Conflict,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
        }
    }

    /// Whether the filesystem may have been left partially updated.
    ///
    /// Operations are not transactional: a structural I/O failure halts the
    /// operation after whatever steps already completed.
    pub fn is_partial_mutation(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::Filesystem { .. }))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Configuration,
    Io,
    Internal,
}

/// Convenient result type alias.
pub type TrellisResult<T> = Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn domain_not_found_maps_to_not_found_category() {
        let err: TrellisError = DomainError::ComponentNotFound {
            id: "soup".into(),
            suggestions: vec!["foo/soup".into()],
        }
        .into();

        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.to_string().contains("foo/soup"));
    }

    #[test]
    fn filesystem_failure_is_partial_mutation() {
        let err: TrellisError = ApplicationError::Filesystem {
            operation: "rename".into(),
            path: PathBuf::from("bar/foo"),
            reason: "permission denied".into(),
        }
        .into();

        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.is_partial_mutation());
    }
}
