//! Command-line interface components
//!
//! This module contains CLI-specific code for arte, including argument
//! parsing, progress display, result tables and user interaction.

pub mod args;
pub mod commands;
pub mod output;
pub mod progress;

pub use args::{
    parse_metadata, ArtifactArgs, Cli, Commands, DeleteArgs, GetArgs, GlobalArgs, PutArgs,
    SearchArgs,
};
pub use commands::{
    delete_with_confirmation, handle_delete, handle_get, handle_put, handle_search,
    CommandContext,
};
pub use output::{format_bytes, render_records};
pub use progress::{ProgressReporter, ReporterConfig};
