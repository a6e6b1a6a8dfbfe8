//! Application layer for Trellis.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ComponentService, ScaffoldService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Project**: the opened project and its loaded registry
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod project;
pub mod services;

// Re-export main services
pub use services::{
    AddOptions, ComponentInfo, ComponentService, CreateOptions, MutationReport, MvOutcome,
    ScaffoldService, TemplateInfo,
};

// Re-export port traits (for adapter implementation)
pub use ports::{FsNode, Filesystem, RegistryStore, TemplateExpander, TemplateStore};

pub use error::ApplicationError;
pub use project::Project;
