//! Streamed download with atomic publication
//!
//! The body is written chunk by chunk to a temporary file in the destination
//! directory. Once the stream ends, the file is renamed to the name the
//! server announced in `Content-Disposition`, but only if every announced
//! byte arrived. Otherwise it is deleted. A half-received artifact is never
//! visible under its final name.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Method;

use crate::app::client::config::ClientConfig;
use crate::app::client::http::{append_metadata, HttpHandler};
use crate::app::models::{ArtifactDescriptor, RemotePayload, TransferProgress};
use crate::app::transfer::{HeaderOutcome, PendingDownload};
use crate::constants::{api, limits};
use crate::errors::{ArtifactResult, RemoteError, TransferError};

/// Path segments of the download endpoint
pub fn download_segments(descriptor: &ArtifactDescriptor) -> Vec<&str> {
    vec![
        api::BUCKETS,
        descriptor.bucket.as_str(),
        api::ARTIFACTS,
        descriptor.name.as_str(),
        descriptor.version.as_deref().unwrap_or(api::LATEST_VERSION),
    ]
}

pub async fn download<F>(
    http: &HttpHandler,
    config: &ClientConfig,
    descriptor: &ArtifactDescriptor,
    destination_dir: &Path,
    mut on_progress: F,
) -> ArtifactResult<PathBuf>
where
    F: FnMut(TransferProgress),
{
    let mut url = http.endpoint(download_segments(descriptor))?;
    append_metadata(&mut url, &descriptor.metadata);

    let mut pending = PendingDownload::create(destination_dir, config.max_response_size)?;

    let response = http
        .request(Method::GET, url)
        .header(ACCEPT, api::ZIP_MIME)
        .send()
        .await
        .map_err(TransferError::Request)?;

    let status = response.status();
    if let HeaderOutcome::Rejected { status } = pending.accept_headers(status, response.headers())? {
        let body = read_error_body(response).await;
        tracing::debug!("Download of {} rejected with HTTP {}", descriptor, status);
        return Err(RemoteError {
            status: status.as_u16(),
            payload: RemotePayload::parse(&body),
        }
        .into());
    }

    tracing::info!(
        "Receiving {} as {} ({} bytes)",
        descriptor,
        pending.final_filename().unwrap_or_default(),
        pending
            .expected_size()
            .map_or_else(|| "unknown".to_string(), |size| size.to_string())
    );

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                let progress = pending.write_chunk(&bytes).await?;
                on_progress(progress);
            }
            Err(e) => {
                tracing::warn!(
                    "Download stream of {} interrupted after {} bytes: {}",
                    descriptor,
                    pending.received_size(),
                    e
                );
                pending.mark_interrupted();
                break;
            }
        }
    }

    pending.finalize().await
}

/// Collect an error body as text, bounded in size
///
/// A body that cannot be read in full still yields whatever arrived, so the
/// caller always has something to report.
async fn read_error_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                let room = limits::MAX_ERROR_BODY_SIZE.saturating_sub(body.len());
                body.extend_from_slice(&bytes[..bytes.len().min(room)]);
                if body.len() >= limits::MAX_ERROR_BODY_SIZE {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("Error body truncated: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
