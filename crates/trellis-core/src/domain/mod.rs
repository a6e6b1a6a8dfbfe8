//! Core domain layer for Trellis.
//!
//! Pure business logic: component identity, the registry, the rename/move/
//! remove planner and the template model. All I/O is behind the ports defined
//! in the application layer.
//!
//! - **No I/O**: no filesystem, network, or process calls
//! - **Immutable plans**: every mutation is described before anything runs
//! - **Rich domain model**: behavior lives in entities, not services

pub mod entities;
pub mod error;
pub mod planner;
pub mod replace;
pub mod value_objects;

mod validation;

pub use entities::{
    ComponentContext, ComponentId, ComponentRecord, ContextValue, DirectoryToCreate, FileToWrite,
    FsEntry, FsOperation, MutationPlan, MvAction, NestedComponents, PlannedOperation, Presence,
    ProjectLayout, ProjectStructure, Registry, RelativePath, Relocation, Substitution,
    WritePolicy,
    layout::is_text_substitutable,
    template::{
        DirectorySpec, FileSpec, Template, TemplateContent, TemplateId, TemplateNode,
        TemplateParameters, TemplateSource, TemplateTree, to_module_name,
    },
};

pub use error::{DomainError, ErrorCategory};
pub use planner::Planner;
pub use replace::ReplaceMode;
pub use validation::DomainValidator;
pub use value_objects::{ComponentKind, ComponentLayout, KindFlags};
