//! Infrastructure adapters for Trellis.
//!
//! This crate implements the ports defined in `trellis-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod expander;
pub mod filesystem;
pub mod project;
pub mod registry_store;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use expander::PlaceholderExpander;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use project::{detect_project, find_project_root, open_project};
pub use registry_store::{InMemoryRegistryStore, JsonRegistryStore, REGISTRY_FILE};
pub use template_loader::FilesystemTemplateLoader;
pub use template_store::InMemoryTemplateStore;
