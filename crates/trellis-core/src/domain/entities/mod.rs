pub mod action;
pub mod common;
pub mod component;
pub mod layout;
pub mod mutation_plan;
pub mod project_structure;
pub mod registry;
pub mod template;

pub use crate::domain::DomainError;
pub use action::MvAction;
pub use common::RelativePath;
pub use component::{ComponentContext, ComponentId, ComponentRecord, ContextValue};
pub use layout::ProjectLayout;
pub use mutation_plan::{
    FsOperation, MutationPlan, NestedComponents, PlannedOperation, Presence, Relocation,
    Substitution,
};
pub use project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure, WritePolicy};
pub use registry::Registry;
pub use template::{Template, TemplateId, TemplateParameters};
