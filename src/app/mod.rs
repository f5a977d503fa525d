//! Core transfer engine for arte
//!
//! This module contains the HTTP client, the data models, the local archive
//! check and the streaming primitives used by uploads and downloads.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use arte_cli::app::{ArteClient, ArtifactDescriptor, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArteClient::new("http://localhost:80", None, ClientConfig::default())?;
//! client.check_server().await?;
//!
//! let descriptor = ArtifactDescriptor::new("b1", "n1").with_version("1.0");
//! let path = client
//!     .download(&descriptor, Path::new("."), |progress| {
//!         println!("{:?}", progress.percentage());
//!     })
//!     .await?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod client;
pub mod models;
pub mod transfer;

// Re-export main public API
pub use archive::{is_zip_signature, validate_archive};
pub use client::{ArteClient, ClientConfig};
pub use models::{
    ArtifactDescriptor, ArtifactRecord, Metadata, RemotePayload, SearchQuery, TransferProgress,
    UploadReceipt,
};
pub use transfer::{DownloadPhase, DownloadState, PendingDownload, ProgressBody};
