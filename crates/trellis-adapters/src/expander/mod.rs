//! Template expanders.

mod placeholder;

pub use placeholder::PlaceholderExpander;
