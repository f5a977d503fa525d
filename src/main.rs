//! arte CLI application
//!
//! Command-line client for the arte artifact storage service: put, get,
//! search and delete artifacts.

use std::process;

use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use arte_cli::app::ArteClient;
use arte_cli::cli::{
    handle_delete, handle_get, handle_put, handle_search, Cli, CommandContext, Commands,
};
use arte_cli::config::AppConfig;
use arte_cli::errors::Result;

const LOG_TARGETS: [&str; 2] = ["arte_cli", "arte"];

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let verbose = cli.global.verbose || cli.global.very_verbose;

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        if verbose {
            eprintln!("{:#?}", e);
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.global.config.clone()).await?;
    config.apply_cli_overrides(&cli.global);

    init_logging(&cli, &config);
    init_colors(&cli);

    info!("arte v{} starting", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => debug!("Loaded configuration from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    debug!("Effective configuration: {:?}", config);

    let client = ArteClient::new(
        config.server_url(),
        config.server.token.clone(),
        config.client.to_runtime_config(),
    )?;
    let ctx = CommandContext::new(client, config.progress.clone(), cli.global.quiet);

    match cli.command {
        Commands::Put(args) => {
            info!("Executing put command");
            handle_put(&ctx, args).await
        }
        Commands::Get(args) => {
            info!("Executing get command");
            handle_get(&ctx, args).await
        }
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(&ctx, args).await
        }
        Commands::Delete(args) => {
            info!("Executing delete command");
            handle_delete(&ctx, args).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Logs go to stderr so they never overwrite the status line on stdout.
fn init_logging(cli: &Cli, config: &AppConfig) {
    let flags_given = cli.global.quiet || cli.global.verbose || cli.global.very_verbose;
    let level = match (&config.logging.level, flags_given) {
        (Some(level), false) => level.clone(),
        _ => cli.log_level().to_string(),
    };

    fmt()
        .with_env_filter(log_filter(&level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}

/// Filter enabling `level` for both the library and the binary targets
fn log_filter(level: &str) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => {
                eprintln!("Ignoring invalid log level '{}': {}", level, e);
                break;
            }
        }
    }
    filter
}

fn init_colors(cli: &Cli) {
    if cli.global.no_color || !atty::is(atty::Stream::Stdout) {
        crossterm::style::force_color_output(false);
    }
}
