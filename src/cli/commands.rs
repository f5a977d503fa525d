//! Command handlers for the arte CLI
//!
//! Each handler probes the server, runs one operation and reports the steps
//! on its own [`ProgressReporter`]. Any error stops the reporter with a red
//! `ERROR` line and is returned unchanged for `main` to print.

use std::io::{self, Write};

use crossterm::style::Stylize;
use tracing::{debug, info};

use crate::app::models::{ArtifactDescriptor, ArtifactRecord, SearchQuery};
use crate::app::{validate_archive, ArteClient};
use crate::cli::output::{format_bytes, render_records};
use crate::cli::progress::{ProgressReporter, ReporterConfig};
use crate::cli::{DeleteArgs, GetArgs, PutArgs, SearchArgs};
use crate::errors::{RemoteError, Result};

/// Everything a handler needs besides its own arguments
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub client: ArteClient,
    pub reporter: ReporterConfig,
    /// Print only the essential result
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(client: ArteClient, reporter: ReporterConfig, quiet: bool) -> Self {
        Self {
            client,
            reporter,
            quiet,
        }
    }

    fn reporter(&self) -> ProgressReporter {
        if self.quiet {
            ProgressReporter::new(ReporterConfig {
                enabled: false,
                ..self.reporter.clone()
            })
        } else {
            ProgressReporter::new(self.reporter.clone())
        }
    }
}

/// Run `result`'s error path through the reporter
fn report_failure<T>(reporter: &mut ProgressReporter, result: Result<T>) -> Result<T> {
    if result.is_err() {
        reporter.fail("ERROR".red());
    }
    result
}

/// Handle the put command
pub async fn handle_put(ctx: &CommandContext, args: PutArgs) -> Result<()> {
    let mut reporter = ctx.reporter();
    let result = put(ctx, &args, &mut reporter).await;
    report_failure(&mut reporter, result)
}

async fn put(ctx: &CommandContext, args: &PutArgs, reporter: &mut ProgressReporter) -> Result<()> {
    let descriptor = args.artifact.descriptor()?;

    reporter.start("Checking file".blue(), false)?;
    let size = validate_archive(&args.path).await?;
    reporter.stop("File checked!".green(), false);
    debug!("{} is a zip archive of {}", args.path.display(), format_bytes(size));

    contact_server(&ctx.client, reporter).await?;

    reporter.start("Sending file".blue(), true)?;
    let label = "Sending file".blue().to_string();
    let receipt = ctx
        .client
        .upload(&descriptor, &args.path, |progress| {
            reporter.tick(progress.progress_line(&label));
        })
        .await?;

    if !receipt.is_success() {
        return Err(RemoteError {
            status: receipt.status,
            payload: receipt.body,
        }
        .into());
    }
    reporter.stop("File sent!".green(), false);

    if ctx.quiet {
        println!("{}", receipt.body.to_pretty());
    }
    Ok(())
}

/// Handle the get command
pub async fn handle_get(ctx: &CommandContext, args: GetArgs) -> Result<()> {
    let mut reporter = ctx.reporter();
    let result = get(ctx, &args, &mut reporter).await;
    report_failure(&mut reporter, result)
}

async fn get(ctx: &CommandContext, args: &GetArgs, reporter: &mut ProgressReporter) -> Result<()> {
    let descriptor = args.artifact.descriptor()?;

    contact_server(&ctx.client, reporter).await?;

    reporter.start("Receiving file".blue(), true)?;
    let label = "Receiving file".blue().to_string();
    let destination = ctx
        .client
        .download(&descriptor, &args.output, |progress| {
            reporter.tick(progress.progress_line(&label));
        })
        .await?;
    reporter.stop("File received!".green(), false);

    info!("Saved {} to {}", descriptor, destination.display());
    if ctx.quiet {
        println!("{}", destination.display());
    }
    Ok(())
}

/// Handle the search command
pub async fn handle_search(ctx: &CommandContext, args: SearchArgs) -> Result<()> {
    let mut reporter = ctx.reporter();
    let result = search(ctx, &args, &mut reporter).await;
    report_failure(&mut reporter, result)
}

async fn search(
    ctx: &CommandContext,
    args: &SearchArgs,
    reporter: &mut ProgressReporter,
) -> Result<()> {
    let query = args.query()?;

    contact_server(&ctx.client, reporter).await?;

    let records = find(&ctx.client, &query, reporter).await?;
    if !records.is_empty() {
        println!("{}", render_records(&records));
    }
    Ok(())
}

/// Handle the delete command
pub async fn handle_delete(ctx: &CommandContext, args: DeleteArgs) -> Result<()> {
    let mut reporter = ctx.reporter();
    let result = delete(ctx, &args, &mut reporter).await;
    report_failure(&mut reporter, result)
}

async fn delete(
    ctx: &CommandContext,
    args: &DeleteArgs,
    reporter: &mut ProgressReporter,
) -> Result<()> {
    let descriptor = args.artifact.descriptor()?;

    contact_server(&ctx.client, reporter).await?;

    let assume_yes = args.yes;
    let deleted = delete_with_confirmation(&ctx.client, &descriptor, reporter, |records| {
        if assume_yes {
            Ok(true)
        } else {
            confirm_deletion(records.len())
        }
    })
    .await?;

    if !deleted.is_empty() {
        println!("{}", render_records(&deleted));
    }
    Ok(())
}

/// Search, confirm, then delete what still matches
///
/// The exact-match search is shown and `confirm` decides whether to go on.
/// The search runs again after confirmation, and the DELETE is only sent if
/// something still matches. Returns the deleted records, empty if nothing
/// was deleted.
pub async fn delete_with_confirmation<F>(
    client: &ArteClient,
    descriptor: &ArtifactDescriptor,
    reporter: &mut ProgressReporter,
    confirm: F,
) -> Result<Vec<ArtifactRecord>>
where
    F: FnOnce(&[ArtifactRecord]) -> Result<bool>,
{
    let query = SearchQuery::exact(descriptor);

    let matches = find(client, &query, reporter).await?;
    if matches.is_empty() {
        return Ok(Vec::new());
    }
    println!("{}", render_records(&matches));

    if !confirm(&matches)? {
        info!("Deletion of {} cancelled", descriptor);
        println!("Nothing deleted.");
        return Ok(Vec::new());
    }

    // The catalog may have changed while the prompt was open
    let current = client.search(&query).await?;
    if current.is_empty() {
        info!("{} no longer matches anything, skipping delete", descriptor);
        return Ok(Vec::new());
    }

    reporter.start("Deleting artifact".blue(), false)?;
    let deleted = client.delete(descriptor).await?;
    reporter.stop(format!("Deleted {}!", deleted.len()).green(), false);
    Ok(deleted)
}

async fn contact_server(client: &ArteClient, reporter: &mut ProgressReporter) -> Result<()> {
    reporter.start("Contacting server".blue(), false)?;
    client.check_server().await?;
    reporter.stop("Connected to the server!".green(), false);
    Ok(())
}

async fn find(
    client: &ArteClient,
    query: &SearchQuery,
    reporter: &mut ProgressReporter,
) -> Result<Vec<ArtifactRecord>> {
    reporter.start("Searching artifact".blue(), false)?;
    let records = client.search(query).await?;
    reporter.stop(format!("Found {}!", records.len()).green(), false);
    Ok(records)
}

/// Ask on the terminal before deleting
fn confirm_deletion(count: usize) -> Result<bool> {
    print!("Delete {} artifact(s)? [y/N]: ", count);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;

    Ok(response.trim().to_lowercase().starts_with('y'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ClientConfig;
    use crate::errors::{AppError, ArtifactError};

    fn context(url: &str, quiet: bool) -> CommandContext {
        let client = ArteClient::new(url, None, ClientConfig::default()).unwrap();
        CommandContext::new(client, ReporterConfig::hidden(), quiet)
    }

    #[test]
    fn test_quiet_context_hides_reporter() {
        let ctx = context("http://localhost:80", true);
        let mut reporter = ctx.reporter();
        reporter.start("Checking file", false).unwrap();
        assert!(reporter.is_running());
        reporter.stop("done", false);
        assert!(!reporter.is_running());
    }

    #[test]
    fn test_report_failure_stops_reporter() {
        let mut reporter = ProgressReporter::new(ReporterConfig::hidden());
        reporter.start("Contacting server", false).unwrap();

        let result: Result<()> = Err(AppError::generic("boom"));
        assert!(report_failure(&mut reporter, result).is_err());
        assert!(!reporter.is_running());
    }

    #[test]
    fn test_quiet_failure_still_reports_error_line() {
        let ctx = context("http://localhost:80", true);
        let mut reporter = ctx.reporter();
        reporter.start("Contacting server", false).unwrap();

        let result: Result<()> = Err(AppError::generic("boom"));
        assert!(report_failure(&mut reporter, result).is_err());
        assert_eq!(reporter.final_line_count(), 1);

        let ok: Result<()> = Ok(());
        assert!(report_failure(&mut reporter, ok).is_ok());
        assert_eq!(reporter.final_line_count(), 1);
    }

    #[test]
    fn test_put_missing_file_is_invalid_input() {
        let ctx = context("http://localhost:80", true);
        let dir = tempfile::tempdir().unwrap();
        let args = PutArgs {
            path: dir.path().join("missing.zip"),
            artifact: crate::cli::ArtifactArgs {
                bucket: "b1".to_string(),
                name: "n1".to_string(),
                version: None,
                metadata: Vec::new(),
            },
        };

        let err = tokio_test::block_on(handle_put(&ctx, args)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Artifact(ArtifactError::InvalidInput(_))
        ));
    }
}
