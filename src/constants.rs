//! Application constants for arte-cli
//!
//! This module centralizes the constants used throughout the client,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Server base URL override
    pub const URL: &str = "ARTE_URL";

    /// Authorization token override
    pub const TOKEN: &str = "ARTE_TOKEN";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default server base URL when nothing else is configured
    pub const DEFAULT_BASE_URL: &str = "http://localhost:80";

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("arte-cli/", env!("CARGO_PKG_VERSION"));

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);
}

/// Remote API paths and wire names
pub mod api {
    /// Liveness endpoint
    pub const PING: &str = "ping";

    /// Bucket collection segment
    pub const BUCKETS: &str = "buckets";

    /// Artifact collection segment
    pub const ARTIFACTS: &str = "artifacts";

    /// Catalog search segment (under `artifacts`)
    pub const SEARCH: &str = "search";

    /// Version segment used when a download names no version
    pub const LATEST_VERSION: &str = "latest";

    /// Multipart part name carrying the artifact file
    pub const ARTIFACT_PART: &str = "artifact";

    /// Media type of artifacts
    pub const ZIP_MIME: &str = "application/zip";

    /// Media type of catalog responses
    pub const JSON_MIME: &str = "application/json";
}

/// Transfer size limits
pub mod limits {
    /// Largest response body accepted by a download (10 GB)
    pub const MAX_RESPONSE_SIZE: u64 = 10_000_000_000;

    /// Largest error body collected from a rejected download (1 MiB)
    pub const MAX_ERROR_BODY_SIZE: usize = 1024 * 1024;
}

/// File operation constants
pub mod files {
    /// Prefix of in-flight download files
    pub const TEMP_FILE_PREFIX: &str = ".arte-";

    /// Suffix of in-flight download files
    pub const TEMP_FILE_SUFFIX: &str = ".part";

    /// Read size for streamed uploads (64KB)
    pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
}

/// Status line rendering
pub mod progress {
    use super::Duration;

    /// Spinner frame interval for indeterminate progress
    pub const SPINNER_INTERVAL: Duration = Duration::from_millis(300);

    /// Minimum time between two manual renders
    pub const MIN_RENDER_INTERVAL: Duration = Duration::from_millis(200);

    /// Spinner glyphs; the last entry is shown once the spinner is finished
    pub const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒", " "];

    /// Width of the determinate bar in cells
    pub const BAR_WIDTH: usize = 40;

    /// Filled bar cell
    pub const BAR_FILLED: char = '▇';

    /// Empty bar cell
    pub const BAR_EMPTY: char = '-';
}

/// Result table layout
pub mod output {
    /// Minimum column width
    pub const MIN_COLUMN_WIDTH: usize = 10;
}

pub use http::{DEFAULT_BASE_URL, USER_AGENT};
pub use limits::MAX_RESPONSE_SIZE;
