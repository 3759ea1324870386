//! HTTP route handlers.

pub mod admin;
pub mod assets;
pub mod health;
pub mod hooks;
pub mod slider;
