//! Shared utilities and common types for the image slider service.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing utilities (module secure key, upload filename salts)
//! - Common validation logic for admin form fields
//! - HTML escaping for rendered fragments

pub mod crypto;
pub mod html;
pub mod validation;
