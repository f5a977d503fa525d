//! Temporary file behind an in-flight download
//!
//! The temporary file is created inside the destination directory so the
//! final rename never crosses filesystems. It is owned by a [`TempPath`],
//! which deletes it on drop: every early return, `?`, or panic between
//! creation and publication removes it.

use std::path::{Path, PathBuf};

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::app::models::TransferProgress;
use crate::app::transfer::state::{Completion, DownloadState, HeaderOutcome};
use crate::constants::files;
use crate::errors::{ArtifactResult, TransferError};

#[derive(Debug)]
pub struct PendingDownload {
    temp_path: TempPath,
    file: File,
    destination_dir: PathBuf,
    state: DownloadState,
}

impl PendingDownload {
    /// Create the temporary file in `destination_dir`
    pub fn create(destination_dir: &Path, max_size: u64) -> ArtifactResult<Self> {
        let named = tempfile::Builder::new()
            .prefix(files::TEMP_FILE_PREFIX)
            .suffix(files::TEMP_FILE_SUFFIX)
            .tempfile_in(destination_dir)
            .map_err(TransferError::Io)?;
        let (std_file, temp_path) = named.into_parts();

        tracing::debug!("Created temporary download file {}", temp_path.display());

        Ok(Self {
            temp_path,
            file: File::from_std(std_file),
            destination_dir: destination_dir.to_path_buf(),
            state: DownloadState::new(max_size),
        })
    }

    pub fn temporary_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn final_filename(&self) -> Option<&str> {
        self.state.final_filename()
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.state.expected_size()
    }

    pub fn received_size(&self) -> u64 {
        self.state.received_size()
    }

    /// Negotiate the response head
    pub fn accept_headers(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> ArtifactResult<HeaderOutcome> {
        self.state.on_headers(status, headers)
    }

    /// Append a chunk of the body
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> ArtifactResult<TransferProgress> {
        let progress = self.state.on_chunk(chunk.len())?;
        self.file
            .write_all(chunk)
            .await
            .map_err(TransferError::Io)?;
        Ok(progress)
    }

    /// Record that the transport failed mid-body
    pub fn mark_interrupted(&mut self) {
        self.state.on_interrupted();
    }

    /// Publish the file under its negotiated name, or discard it
    ///
    /// Consumes the download: afterwards the temporary file is either renamed
    /// to the returned path or gone.
    pub async fn finalize(mut self) -> ArtifactResult<PathBuf> {
        match self.state.finish() {
            Completion::Complete { filename, received } => {
                self.file.flush().await.map_err(TransferError::Io)?;
                self.file.sync_all().await.map_err(TransferError::Io)?;
                drop(self.file);

                let destination = self.destination_dir.join(&filename);
                self.temp_path
                    .persist(&destination)
                    .map_err(|e| TransferError::Persist {
                        destination: destination.clone(),
                        source: e.error,
                    })?;

                tracing::info!(
                    "Downloaded {} ({} bytes)",
                    destination.display(),
                    received
                );
                Ok(destination)
            }
            Completion::Reset { received, expected } => {
                drop(self.file);
                let temp = self.temp_path.to_path_buf();
                if let Err(e) = self.temp_path.close() {
                    tracing::warn!(
                        "Failed to remove temporary file {}: {}",
                        temp.display(),
                        e
                    );
                }
                tracing::warn!(
                    "Connection reset after {} bytes, discarded partial download",
                    received
                );
                Err(TransferError::ConnectionReset { received, expected }.into())
            }
        }
    }
}
