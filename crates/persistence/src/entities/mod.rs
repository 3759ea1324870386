//! Database entity definitions.

pub mod configuration;
pub mod hook;
pub mod slide;

pub use configuration::ConfigurationEntity;
pub use hook::HookRegistrationEntity;
pub use slide::{SlideMetaEntity, SlideRowEntity, SlideTranslationEntity};
