//! # pkgadmin-core
//!
//! Core types shared across all pkgadmin crates.
//!
//! This crate provides:
//! - `PackageName` parsing for `type://tenant/namespace/name[@version]`
//! - `PackageMetadata`, the JSON document stored with every package version
//! - `AdminError` for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (PackageName, PackageMetadata, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AdminError, AdminResult, ServerErrorKind};
pub use types::{NamespaceName, PackageMetadata, PackageName, PackageNameError, PackageType};
