//! Persistence layer for the image slider service.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Module table install/drop statements

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod schema;
