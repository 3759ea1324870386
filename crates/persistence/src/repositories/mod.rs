//! Repository implementations for database operations.

pub mod configuration;
pub mod hook;
pub mod slide;

pub use configuration::PgConfigurationStore;
pub use hook::HookRepository;
pub use slide::{SlideListQuery, SlideRepository};
