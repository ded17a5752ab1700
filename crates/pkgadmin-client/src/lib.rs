//! Client for the packages admin REST API
//!
//! This crate reads and writes package metadata, uploads and downloads
//! package binaries, deletes versions and lists packages. Every operation is
//! available as a future-returning call and as a blocking call; both go
//! through one request pipeline:
//!
//! - `paths`: package name → REST path → URL
//! - `dispatch`: auth decoration, submission, typed decoding
//! - `upload` / `download`: multipart and streaming pipelines
//! - `errors`: mapping of every failure into `AdminError`
//! - `pending` / `bridge`: outcome slots and the blocking surface

pub mod auth;
pub mod bridge;
pub mod client;
pub mod dispatch;
pub mod download;
pub mod paths;
pub mod pending;
pub mod transport;
pub mod upload;

pub(crate) mod errors;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types
pub use auth::{AuthError, AuthProvider, BasicAuth, NoAuth, TokenAuth};
pub use client::{PackagesClient, PackagesClientBuilder};
pub use pending::{Completion, PendingOperation};
pub use transport::{AdminRequest, HttpExecutor, RawResponse, ReqwestExecutor, TransportError};

pub use pkgadmin_core::{AdminError, AdminResult, PackageMetadata, PackageName};
