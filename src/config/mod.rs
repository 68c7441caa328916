//! Configuration module for migration runs
//!
//! This module provides the `MigrationConfig` struct and its type-safe builder
//! for configuring the crawl, asset and transform phases with validation and
//! sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{Complete, MigrationConfigBuilder, WithOutputDir};
pub use types::{MigrationConfig, PaginatedSection};
