//! Registry store adapters.

mod json;
mod memory;

pub use json::{JsonRegistryStore, REGISTRY_FILE};
pub use memory::InMemoryRegistryStore;
