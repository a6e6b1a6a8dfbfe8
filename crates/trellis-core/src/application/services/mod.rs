//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "add a component" or "rename a component".

pub mod component_service;
pub mod mutator;
pub mod scaffold_service;

pub use component_service::{ComponentInfo, ComponentService, MvOutcome};
pub use mutator::{FilesystemMutator, MutationReport, OPS_TARGET};
pub use scaffold_service::{AddOptions, CreateOptions, ScaffoldService, TemplateInfo};
