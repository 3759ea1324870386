//! Application services behind the HTTP handlers.

pub mod image_store;
pub mod lifecycle;
pub mod render_cache;
pub mod slider_admin;
pub mod widget;

pub use image_store::{ImageStore, UploadedImage};
pub use render_cache::{RenderCache, RenderKey};
pub use slider_admin::{AdminOutcome, SliderAdmin};
