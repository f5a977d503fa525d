//! Download state machine
//!
//! ```text
//! AwaitingHeaders ──200──▶ Streaming ──clean end, full length──▶ Complete
//!        │                     └──transport error / short body──▶ Reset
//!        └──other status──▶ Rejected
//! ```
//!
//! Header negotiation and completion detection are pure functions over this
//! state. No I/O happens here; the downloader feeds it what the transport
//! reports.

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_LENGTH};
use reqwest::StatusCode;

use crate::app::models::TransferProgress;
use crate::errors::{ArtifactResult, ProtocolError, TransferError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    AwaitingHeaders,
    Streaming,
    Rejected,
    Complete,
    Reset,
}

/// Result of inspecting the response head
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// Body is the artifact and should be streamed to disk
    Accepted {
        filename: String,
        expected_size: Option<u64>,
    },
    /// Body is an error payload
    Rejected { status: StatusCode },
}

/// How a streamed body ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Every announced byte arrived; publish under `filename`
    Complete { filename: String, received: u64 },
    /// Stream broke off; discard
    Reset {
        received: u64,
        expected: Option<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct DownloadState {
    phase: DownloadPhase,
    max_size: u64,
    final_filename: Option<String>,
    expected_size: Option<u64>,
    received_size: u64,
    interrupted: bool,
}

impl DownloadState {
    /// New download accepting at most `max_size` bytes
    pub fn new(max_size: u64) -> Self {
        Self {
            phase: DownloadPhase::AwaitingHeaders,
            max_size,
            final_filename: None,
            expected_size: None,
            received_size: 0,
            interrupted: false,
        }
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    pub fn final_filename(&self) -> Option<&str> {
        self.final_filename.as_deref()
    }

    pub fn expected_size(&self) -> Option<u64> {
        self.expected_size
    }

    pub fn received_size(&self) -> u64 {
        self.received_size
    }

    /// Current progress snapshot
    pub fn progress(&self) -> TransferProgress {
        TransferProgress::new(self.received_size, self.expected_size.unwrap_or(0))
    }

    /// Inspect the response head
    ///
    /// A 200 must name the destination through `Content-Disposition`; any
    /// other status turns the body into an error payload.
    pub fn on_headers(
        &mut self,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> ArtifactResult<HeaderOutcome> {
        debug_assert_eq!(self.phase, DownloadPhase::AwaitingHeaders);

        if status != StatusCode::OK {
            self.phase = DownloadPhase::Rejected;
            return Ok(HeaderOutcome::Rejected { status });
        }

        let expected_size = content_length(headers);
        if let Some(size) = expected_size {
            if size > self.max_size {
                self.phase = DownloadPhase::Reset;
                return Err(TransferError::SizeLimitExceeded {
                    limit: self.max_size,
                    size,
                }
                .into());
            }
        }

        let filename = filename_from_headers(headers)?;
        self.final_filename = Some(filename.clone());
        self.expected_size = expected_size;
        self.phase = DownloadPhase::Streaming;

        Ok(HeaderOutcome::Accepted {
            filename,
            expected_size,
        })
    }

    /// Account for a received chunk
    pub fn on_chunk(&mut self, len: usize) -> ArtifactResult<TransferProgress> {
        debug_assert_eq!(self.phase, DownloadPhase::Streaming);

        let received = self.received_size + len as u64;
        if received > self.max_size {
            self.phase = DownloadPhase::Reset;
            return Err(TransferError::SizeLimitExceeded {
                limit: self.max_size,
                size: received,
            }
            .into());
        }
        self.received_size = received;
        Ok(self.progress())
    }

    /// The transport reported an error before the end of the body
    pub fn on_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// Decide whether the received body may be published
    ///
    /// Only a body that ended without a transport error and matched the
    /// announced length counts as complete.
    pub fn finish(&mut self) -> Completion {
        let complete = self.phase == DownloadPhase::Streaming
            && !self.interrupted
            && self
                .expected_size
                .map_or(true, |expected| expected == self.received_size);

        match (&self.final_filename, complete) {
            (Some(filename), true) => {
                self.phase = DownloadPhase::Complete;
                Completion::Complete {
                    filename: filename.clone(),
                    received: self.received_size,
                }
            }
            _ => {
                self.phase = DownloadPhase::Reset;
                Completion::Reset {
                    received: self.received_size,
                    expected: self.expected_size,
                }
            }
        }
    }
}

/// Announced body length, if any
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Destination filename negotiated through `Content-Disposition`
pub fn filename_from_headers(headers: &HeaderMap) -> Result<String, ProtocolError> {
    let value = headers
        .get(CONTENT_DISPOSITION)
        .ok_or(ProtocolError::MissingHeader {
            name: "Content-Disposition",
        })?;
    let value = value
        .to_str()
        .map_err(|_| ProtocolError::MalformedContentDisposition {
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        })?;

    let filename = parse_content_disposition(value).ok_or_else(|| {
        ProtocolError::MalformedContentDisposition {
            value: value.to_string(),
        }
    })?;
    validate_filename(&filename)?;
    Ok(filename)
}

/// Extract the `filename` parameter of a Content-Disposition value
///
/// Accepts the quoted form (`filename="n1.zip"`, with `\"` escapes) and a
/// bare token (`filename=n1.zip`). A bare value containing a quote is
/// malformed. `filename*` is not consulted.
pub fn parse_content_disposition(value: &str) -> Option<String> {
    // The first segment is the disposition type
    for param in split_params(value).into_iter().skip(1) {
        let Some((key, raw)) = param.trim().split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("filename") {
            continue;
        }

        let raw = raw.trim();
        let filename = match raw.strip_prefix('"') {
            Some(quoted) => unquote(quoted)?,
            None if raw.contains('"') => return None,
            None => raw.to_string(),
        };
        return (!filename.is_empty()).then_some(filename);
    }
    None
}

/// Split a header value on `;` outside quoted strings
fn split_params(value: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (index, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    params.push(&value[start..]);
    params
}

/// Body of a quoted string up to its closing quote; `None` if unterminated
fn unquote(quoted: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = quoted.chars();
    loop {
        match chars.next()? {
            '"' => return Some(out),
            '\\' => out.push(chars.next()?),
            c => out.push(c),
        }
    }
}

/// Reject names that would leave the destination directory
pub fn validate_filename(filename: &str) -> Result<(), ProtocolError> {
    let unsafe_name = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
        || (filename.len() >= 2 && filename.as_bytes()[1] == b':');
    if unsafe_name {
        return Err(ProtocolError::UnsafeFilename {
            filename: filename.to_string(),
        });
    }
    Ok(())
}
