//! HTTP client for the artifact storage service
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: endpoint construction and authorization
//! - `probe`: liveness check
//! - `upload`: streamed multipart upload
//! - `download`: streamed download with atomic finalization
//! - `catalog`: search and delete

use std::path::{Path, PathBuf};

use url::Url;

use crate::app::models::{
    ArtifactDescriptor, ArtifactRecord, SearchQuery, TransferProgress, UploadReceipt,
};
use crate::errors::{ArtifactResult, Result};

pub mod catalog;
pub mod config;
pub mod download;
pub mod http;
pub mod probe;
pub mod upload;

pub use config::ClientConfig;

use http::HttpHandler;

/// Client bound to one storage server
///
/// Owns the HTTP connection pool, base URL and optional auth token. Every
/// operation is a single attempt; failures go back to the caller as is.
#[derive(Debug, Clone)]
pub struct ArteClient {
    http: HttpHandler,
    config: ClientConfig,
}

impl ArteClient {
    /// Creates a client for `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, may carry a path prefix
    /// * `token` - Value sent as `Authorization`, if any
    /// * `config` - Transport settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::HttpClient` if the HTTP client cannot be built,
    /// or `InputError::InvalidUrl` if the base URL is unusable
    pub fn new(base_url: &str, token: Option<String>, config: ClientConfig) -> Result<Self> {
        let client = config.build_http_client()?;
        let http = HttpHandler::new(client, base_url, token)?;

        tracing::debug!("Created client for {}", http.base_url());

        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Verify the server answers `GET /ping`
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Connectivity` on any failure
    pub async fn check_server(&self) -> ArtifactResult<()> {
        probe::check_server(&self.http).await
    }

    /// Upload a zip archive as the artifact named by `descriptor`
    ///
    /// `on_progress` receives cumulative byte counts on the calling task.
    /// Any HTTP status resolves to an [`UploadReceipt`].
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::InvalidInput` before any request if the path
    /// is not a readable zip file, or `ArtifactError::Transfer` if the
    /// request fails
    pub async fn upload<F>(
        &self,
        descriptor: &ArtifactDescriptor,
        path: &Path,
        on_progress: F,
    ) -> ArtifactResult<UploadReceipt>
    where
        F: FnMut(TransferProgress),
    {
        upload::upload(&self.http, descriptor, path, on_progress).await
    }

    /// Download the artifact into `destination_dir`
    ///
    /// The file name comes from the server's `Content-Disposition`. The file
    /// appears under that name only once complete.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Remote` for a non-200 answer,
    /// `ArtifactError::Protocol` for unusable headers, and
    /// `ArtifactError::Transfer` if the body is cut short
    pub async fn download<F>(
        &self,
        descriptor: &ArtifactDescriptor,
        destination_dir: &Path,
        on_progress: F,
    ) -> ArtifactResult<PathBuf>
    where
        F: FnMut(TransferProgress),
    {
        download::download(
            &self.http,
            &self.config,
            descriptor,
            destination_dir,
            on_progress,
        )
        .await
    }

    /// Search the catalog; no match is an empty vector
    pub async fn search(&self, query: &SearchQuery) -> ArtifactResult<Vec<ArtifactRecord>> {
        catalog::search(&self.http, query).await
    }

    /// Delete what `descriptor` identifies, returning the removed records
    pub async fn delete(
        &self,
        descriptor: &ArtifactDescriptor,
    ) -> ArtifactResult<Vec<ArtifactRecord>> {
        catalog::delete(&self.http, descriptor).await
    }
}
