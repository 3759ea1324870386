//! Server-rendered HTML fragments.

pub mod admin;
pub mod widget;
