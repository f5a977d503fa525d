//! Streamed multipart upload
//!
//! The archive is validated locally, then sent in a single
//! `PUT /buckets/{bucket}/artifacts/{name}[/{version}]` request whose file
//! part is read from disk chunk by chunk. Progress flows back from the
//! body stream over a channel and is handed to the caller's callback on the
//! caller's task, interleaved with the in-flight request.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use tokio_util::io::ReaderStream;

use crate::app::archive;
use crate::app::client::http::HttpHandler;
use crate::app::models::{ArtifactDescriptor, RemotePayload, TransferProgress, UploadReceipt};
use crate::app::transfer::ProgressBody;
use crate::constants::{api, files};
use crate::errors::{ArtifactResult, TransferError};

/// Path segments of the upload endpoint
pub fn upload_segments(descriptor: &ArtifactDescriptor) -> Vec<&str> {
    let mut segments = vec![
        api::BUCKETS,
        descriptor.bucket.as_str(),
        api::ARTIFACTS,
        descriptor.name.as_str(),
    ];
    if let Some(version) = &descriptor.version {
        segments.push(version.as_str());
    }
    segments
}

pub async fn upload<F>(
    http: &HttpHandler,
    descriptor: &ArtifactDescriptor,
    path: &Path,
    mut on_progress: F,
) -> ArtifactResult<UploadReceipt>
where
    F: FnMut(TransferProgress),
{
    let size = archive::validate_archive(path).await?;
    let url = http.endpoint(upload_segments(descriptor))?;

    let file = tokio::fs::File::open(path)
        .await
        .map_err(TransferError::Io)?;
    let (body, mut progress_rx) = ProgressBody::new(
        ReaderStream::with_capacity(file, files::UPLOAD_CHUNK_SIZE),
        size,
    );

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.zip", descriptor.name));
    let part = Part::stream_with_length(Body::wrap_stream(body), size)
        .file_name(file_name)
        .mime_str(api::ZIP_MIME)
        .map_err(TransferError::Request)?;

    let form = descriptor
        .metadata
        .iter()
        .fold(Form::new(), |form, (key, value)| {
            form.text(key.clone(), value.clone())
        })
        .part(api::ARTIFACT_PART, part);

    tracing::info!("Uploading {} ({} bytes) as {}", path.display(), size, descriptor);

    let send = http.request(Method::PUT, url).multipart(form).send();
    tokio::pin!(send);

    let result = loop {
        tokio::select! {
            result = &mut send => break result,
            Some(progress) = progress_rx.recv() => on_progress(progress),
        }
    };
    while let Ok(progress) = progress_rx.try_recv() {
        on_progress(progress);
    }

    let response = result.map_err(TransferError::Request)?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(TransferError::Request)?;

    if (200..300).contains(&status) {
        tracing::info!("Upload of {} accepted (HTTP {})", descriptor, status);
    } else {
        tracing::warn!("Upload of {} answered with HTTP {}", descriptor, status);
    }

    Ok(UploadReceipt {
        status,
        body: RemotePayload::parse(&text),
    })
}
