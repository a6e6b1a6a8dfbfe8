//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `trellis-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: file and directory primitives
//!   - `RegistryStore`: component registry persistence
//!   - `TemplateStore`: template lookup
//!   - `TemplateExpander`: placeholder expansion into a project structure
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{FsNode, Filesystem, RegistryStore, TemplateExpander, TemplateStore};

#[cfg(test)]
pub use output::{MockFilesystem, MockRegistryStore};
