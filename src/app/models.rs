//! Data models for arte-cli
//!
//! This module defines the core data structures exchanged with the artifact
//! service: the descriptor identifying a request, the catalog record returned
//! by search and delete, and the progress snapshot emitted during transfers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::progress::{BAR_EMPTY, BAR_FILLED, BAR_WIDTH};

/// Metadata filters and fields, ordered for deterministic requests
pub type Metadata = BTreeMap<String, String>;

/// Snapshot of an in-flight transfer
///
/// `bytes_total` is `0` while the total is unknown (no `Content-Length` yet).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub bytes_total: u64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, bytes_total: u64) -> Self {
        Self {
            bytes_transferred,
            bytes_total,
        }
    }

    /// Whether the total size is known
    pub fn is_determinate(&self) -> bool {
        self.bytes_total > 0
    }

    /// Completed percentage, floored and capped at 100
    pub fn percentage(&self) -> Option<u8> {
        if !self.is_determinate() {
            return None;
        }
        let percent = (self.bytes_transferred.saturating_mul(100) / self.bytes_total).min(100);
        Some(percent as u8)
    }

    /// Render `[▇▇▇---] 42% label`
    pub fn progress_line(&self, label: &str) -> String {
        let percent = self.percentage().unwrap_or(0) as usize;
        let filled = percent * BAR_WIDTH / 100;
        let bar: String = std::iter::repeat(BAR_FILLED)
            .take(filled)
            .chain(std::iter::repeat(BAR_EMPTY).take(BAR_WIDTH - filled))
            .collect();
        format!("[{}] {}% {}", bar, percent, label)
    }
}

/// Identifies an artifact request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub bucket: String,
    pub name: String,
    /// `None` means "latest" for downloads and "any" for searches
    pub version: Option<String>,
    pub metadata: Metadata,
}

impl ArtifactDescriptor {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            version: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

/// Filters of a catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub bucket: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub metadata: Metadata,
    /// Exact equality instead of partial (substring/prefix) matching
    pub exact_match: bool,
}

impl SearchQuery {
    /// Exact-match query selecting what a descriptor identifies
    pub fn exact(descriptor: &ArtifactDescriptor) -> Self {
        Self {
            bucket: Some(descriptor.bucket.clone()),
            name: Some(descriptor.name.clone()),
            version: descriptor.version.clone(),
            metadata: descriptor.metadata.clone(),
            exact_match: true,
        }
    }
}

/// Catalog entry returned by search and delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRecord {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub normalized_version: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, alias = "fileSizeBytes")]
    pub file_size: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uploads: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Response body, decoded as JSON when possible
#[derive(Debug, Clone, PartialEq)]
pub enum RemotePayload {
    Json(serde_json::Value),
    Text(String),
}

impl RemotePayload {
    /// Parse a body, keeping the raw text if it is not JSON
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str(body) {
            Ok(value) => RemotePayload::Json(value),
            Err(_) => RemotePayload::Text(body.to_string()),
        }
    }

    /// Human-readable message carried by the payload
    pub fn message(&self) -> String {
        match self {
            RemotePayload::Json(value) => ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()))
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            RemotePayload::Text(text) => text.trim().to_string(),
        }
    }

    /// Pretty form for display
    pub fn to_pretty(&self) -> String {
        match self {
            RemotePayload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            RemotePayload::Text(text) => text.clone(),
        }
    }
}

/// Parsed response of an upload, for any HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: RemotePayload,
}

impl UploadReceipt {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
