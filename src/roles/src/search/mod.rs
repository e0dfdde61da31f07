//! Free-text role search
//!
//! - [`engine`] - query matching over the cached catalog
//! - [`display_name`] - Japanese display-name synthesis from descriptions

pub mod display_name;
pub mod engine;

pub use display_name::{derive_display_name, MAX_DERIVED_CHARS};
pub use engine::{EngineConfig, RoleSearchEngine};
