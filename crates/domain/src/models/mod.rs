//! Domain models for the image slider.

pub mod admin_action;
pub mod language;
pub mod settings;
pub mod shop;
pub mod slide;

pub use admin_action::{AdminAction, FormMode, SettingsForm, SlideForm, TranslationInput};
pub use language::Language;
pub use settings::{SettingKey, SliderSettings};
pub use shop::{Shop, ShopContext, ShopDirectory};
pub use slide::{Slide, SlideTranslation, SlideView};
