//! Command-line argument parsing for arte
//!
//! This module defines the CLI structure using clap derive macros: one
//! subcommand per catalog operation plus global connection and output
//! options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::models::{ArtifactDescriptor, Metadata, SearchQuery};
use crate::errors::InputError;

/// arte - store and fetch versioned artifacts
#[derive(Parser, Debug)]
#[command(
    name = "arte",
    version,
    about = "Client for the arte artifact storage service",
    long_about = "Upload zip artifacts to an arte server, download them back, search the catalog and delete entries.
Downloads are written to a temporary file and only appear under their final name once complete.",
    after_help = "Examples:
  arte put file.zip -b bucket1 -n the-artifact -m arch=x86 -u http://localhost/
  arte get -b bucket1 -n the-artifact -v 1.0 -m arch=x86 -u http://localhost/
  arte search -b bucket1 -n the-artifact
  arte delete -b bucket1 -n the-artifact -v 1.0"
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// arte server URL [default: http://localhost:80]
    #[arg(short, long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Authorization token sent with every request
    #[arg(short, long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Display detailed information
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Only display the essential result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Force disabling of color
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Put an artifact
    Put(PutArgs),

    /// Get an artifact
    Get(GetArgs),

    /// Search the catalog
    Search(SearchArgs),

    /// Delete artifacts
    Delete(DeleteArgs),
}

/// Options naming one artifact
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Bucket name
    #[arg(short, long)]
    pub bucket: String,

    /// Artifact name
    #[arg(short, long)]
    pub name: String,

    /// Artifact version
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// Metadata as key=value, repeatable, or one JSON object
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,
}

/// Arguments for the put command
#[derive(Args, Debug, Clone)]
pub struct PutArgs {
    /// A .zip artifact
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    #[command(flatten)]
    pub artifact: ArtifactArgs,
}

/// Arguments for the get command
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Directory to write the artifact into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

/// Arguments for the search command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Bucket name
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Artifact name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Artifact version
    #[arg(short = 'v', long)]
    pub version: Option<String>,

    /// Metadata as key=value, repeatable, or one JSON object
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub metadata: Vec<String>,

    /// Match filters exactly instead of partially
    #[arg(long)]
    pub exact: bool,
}

/// Arguments for the delete command
#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl ArtifactArgs {
    /// Build the descriptor these options name
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidMetadata` if a metadata value is malformed
    pub fn descriptor(&self) -> Result<ArtifactDescriptor, InputError> {
        Ok(ArtifactDescriptor {
            bucket: self.bucket.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            metadata: parse_metadata(&self.metadata)?,
        })
    }
}

impl SearchArgs {
    /// Build the catalog query these options name
    pub fn query(&self) -> Result<SearchQuery, InputError> {
        Ok(SearchQuery {
            bucket: self.bucket.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            metadata: parse_metadata(&self.metadata)?,
            exact_match: self.exact,
        })
    }
}

/// Parse `-m` values into metadata
///
/// Each value is either `key=value` or a JSON object whose members are all
/// taken. Later values override earlier ones.
pub fn parse_metadata(values: &[String]) -> Result<Metadata, InputError> {
    let mut metadata = Metadata::new();

    for raw in values {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(trimmed)
                .map_err(|e| InputError::InvalidMetadata {
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            for (key, value) in object {
                let value = match value {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                };
                metadata.insert(key, value);
            }
            continue;
        }

        match trimmed.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                metadata.insert(key.trim().to_string(), value.to_string());
            }
            _ => {
                return Err(InputError::InvalidMetadata {
                    value: raw.clone(),
                    reason: "expected key=value or a JSON object".to_string(),
                })
            }
        }
    }

    Ok(metadata)
}
