//! Domain services for the image slider.
//!
//! Services contain business logic that operates on domain models.

pub mod configuration;
pub mod settings_resolution;
pub mod url_normalizer;

pub use configuration::{
    delete_settings, load_settings, save_settings_for_context, scopes_for_context,
    ConfigurationStore, InMemoryConfigurationStore, SettingsWriteReport,
};
pub use settings_resolution::{resolve_scoped_value, ConfigScope, ScopedValue, ValueSource};
pub use url_normalizer::{is_bare_domain, normalize_target_url};
