//! Configuration module for Storybook sessions
//!
//! This module provides the `StorybookConfig` struct and its type-safe builder
//! for configuring sessions with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{StorybookConfigBuilder, WithBaseUrl};
pub use types::StorybookConfig;
