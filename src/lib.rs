//! arte client library
//!
//! A Rust client for the arte artifact storage service. Uploads stream zip
//! archives with progress, downloads are written atomically under the name
//! the server announces, and the catalog can be searched and pruned.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use app::{ArteClient, ArtifactDescriptor, ArtifactRecord, ClientConfig, TransferProgress};
pub use errors::{AppError, ArtifactError, Result};
