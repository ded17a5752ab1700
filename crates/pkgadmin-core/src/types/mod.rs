//! Core data types for package administration.
//!
//! This module provides:
//! - Package names and the namespaces they live in
//! - The metadata document stored next to each package version

pub mod metadata;
pub mod name;

// Re-export all public types
pub use metadata::PackageMetadata;
pub use name::{NamespaceName, PackageName, PackageNameError, PackageType, LATEST_VERSION};
