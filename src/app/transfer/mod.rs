//! Transport-independent building blocks of the transfer engine
//!
//! - `body`: chunked request body reporting cumulative bytes sent
//! - `state`: download header negotiation and completion detection
//! - `pending`: the temporary file behind an in-flight download

pub mod body;
pub mod pending;
pub mod state;

pub use body::{ProgressBody, ProgressReceiver};
pub use pending::PendingDownload;
pub use state::{Completion, DownloadPhase, DownloadState, HeaderOutcome};
