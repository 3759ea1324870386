//! Domain layer for the image slider service.
//!
//! This crate contains:
//! - Domain models (Slide aggregate, settings, shop scoping, admin actions)
//! - Business logic services (URL normalization, settings resolution,
//!   configuration store abstraction)
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;

pub use errors::SliderError;
