//! Catalog search and deletion
//!
//! Both queries answer with a JSON array of records. A 404 means "no
//! match" and is normalized to an empty result.

use reqwest::header::ACCEPT;
use reqwest::{Method, Response, StatusCode};

use crate::app::client::http::{append_metadata, remote_error, HttpHandler};
use crate::app::models::{ArtifactDescriptor, ArtifactRecord, SearchQuery};
use crate::constants::api;
use crate::errors::{ArtifactResult, ProtocolError, TransferError};

pub async fn search(http: &HttpHandler, query: &SearchQuery) -> ArtifactResult<Vec<ArtifactRecord>> {
    let mut url = http.endpoint([api::ARTIFACTS, api::SEARCH])?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("partial", if query.exact_match { "false" } else { "true" });
        if let Some(bucket) = &query.bucket {
            pairs.append_pair("bucket", bucket);
        }
        if let Some(name) = &query.name {
            pairs.append_pair("artifact", name);
        }
        if let Some(version) = &query.version {
            pairs.append_pair("version", version);
        }
    }
    append_metadata(&mut url, &query.metadata);

    let response = http
        .request(Method::GET, url)
        .header(ACCEPT, api::JSON_MIME)
        .send()
        .await
        .map_err(TransferError::Request)?;

    let records = read_records(response).await?;
    tracing::debug!("Search matched {} artifacts", records.len());
    Ok(records)
}

pub async fn delete(
    http: &HttpHandler,
    descriptor: &ArtifactDescriptor,
) -> ArtifactResult<Vec<ArtifactRecord>> {
    let mut segments = vec![
        api::BUCKETS,
        descriptor.bucket.as_str(),
        api::ARTIFACTS,
        descriptor.name.as_str(),
    ];
    if let Some(version) = &descriptor.version {
        segments.push(version.as_str());
    }
    let mut url = http.endpoint(segments)?;
    append_metadata(&mut url, &descriptor.metadata);

    let response = http
        .request(Method::DELETE, url)
        .header(ACCEPT, api::JSON_MIME)
        .send()
        .await
        .map_err(TransferError::Request)?;

    let records = read_records(response).await?;
    tracing::info!("Deleted {} artifacts matching {}", records.len(), descriptor);
    Ok(records)
}

/// Normalize a catalog response into records
async fn read_records(response: Response) -> ArtifactResult<Vec<ArtifactRecord>> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }
    if !status.is_success() {
        return Err(remote_error(response).await?.into());
    }

    let text = response.text().await.map_err(TransferError::Request)?;
    parse_records(&text)
}

/// Decode a record array; any other JSON shape counts as no records
pub fn parse_records(body: &str) -> ArtifactResult<Vec<ArtifactRecord>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ProtocolError::InvalidBody {
            reason: e.to_string(),
        })?;
    if !value.is_array() {
        tracing::debug!("Catalog answered with a non-array body, treating as empty");
        return Ok(Vec::new());
    }

    Ok(serde_json::from_value(value).map_err(|e| ProtocolError::InvalidBody {
        reason: e.to_string(),
    })?)
}
