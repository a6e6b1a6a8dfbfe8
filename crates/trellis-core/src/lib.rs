//! Trellis Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Trellis, a tool
//! that scaffolds Python package layouts and keeps their generated components
//! consistent as they are renamed, moved and removed.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           trellis-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ComponentService, ScaffoldService)    │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, RegistryStore, Templates)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    trellis-adapters (Infrastructure)    │
//! │ (LocalFilesystem, JsonRegistryStore...) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Registry, Planner, ComponentKind)     │
//! │            No I/O                       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trellis_core::application::{ComponentService, Project};
//!
//! # fn run(service: ComponentService) -> trellis_core::error::TrellisResult<()> {
//! let mut project = Project::new("/work/BAR", "BAR", "bar");
//!
//! // `mv foo/soup onion_soup`: rename within the same namespace
//! let action = service.prepare(&mut project, "foo/soup", Some("onion_soup"))?;
//! service.execute(&mut project, &action)?;
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AddOptions, ComponentService, CreateOptions, MutationReport, Project, ScaffoldService,
        ports::{Filesystem, RegistryStore, TemplateExpander, TemplateStore},
    };
    pub use crate::domain::{
        ComponentId, ComponentKind, ComponentRecord, MvAction, Registry, ReplaceMode, Template,
        TemplateId, TemplateParameters,
    };
    pub use crate::error::{TrellisError, TrellisResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
