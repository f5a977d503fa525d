//! Status-line progress reporting
//!
//! One [`ProgressReporter`] is owned by each command. It shows a spinner
//! while the size of the work is unknown and a percentage bar once it is.
//! Renders are debounced so a fast stream of transfer chunks does not
//! repaint the terminal on every chunk.
//!
//! # Examples
//!
//! ```rust,no_run
//! use arte_cli::cli::{ProgressReporter, ReporterConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reporter = ProgressReporter::new(ReporterConfig::default());
//! reporter.start("Contacting server", false)?;
//! // ... do the work ...
//! reporter.stop("Connected to the server!", false);
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::progress;
use crate::errors::ProgressResult;

/// Configuration for progress reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Spinner frame interval
    #[serde(with = "humantime_serde")]
    pub spinner_interval: Duration,
    /// Minimum time between two status renders
    #[serde(with = "humantime_serde")]
    pub min_render_interval: Duration,
    /// Draw to the terminal at all
    pub enabled: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            spinner_interval: progress::SPINNER_INTERVAL,
            min_render_interval: progress::MIN_RENDER_INTERVAL,
            enabled: true,
        }
    }
}

impl ReporterConfig {
    /// Configuration that never draws, for quiet mode and tests
    pub fn hidden() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReporterState {
    Idle,
    Running,
    Stopped,
}

/// Single-owner status line
pub struct ProgressReporter {
    config: ReporterConfig,
    bar: Option<ProgressBar>,
    state: ReporterState,
    last_render: Option<Instant>,
    render_count: u64,
    final_lines: u64,
    is_terminal: bool,
}

impl ProgressReporter {
    pub fn new(config: ReporterConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stdout);

        Self {
            config,
            is_terminal,
            bar: None,
            state: ReporterState::Idle,
            last_render: None,
            render_count: 0,
            final_lines: 0,
        }
    }

    /// Show `label` and enter the running state
    ///
    /// With `determinate` false a spinner is prepended and animated on
    /// indicatif's ticker thread. With `determinate` true the label is
    /// rendered once and later updated through [`tick`](Self::tick).
    /// A reporter that is still running has its previous line cleared.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Template` if the bar style is rejected
    pub fn start(&mut self, label: impl Display, determinate: bool) -> ProgressResult<()> {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }

        // Redirected output gets final lines only
        let target = if self.config.enabled && self.is_terminal {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(None, target);

        if determinate {
            bar.set_style(ProgressStyle::with_template("{msg}")?);
        } else {
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")?
                    .tick_strings(progress::SPINNER_FRAMES),
            );
            bar.enable_steady_tick(self.config.spinner_interval);
        }
        bar.set_message(label.to_string());

        self.bar = Some(bar);
        self.state = ReporterState::Running;
        self.mark_rendered(Instant::now());
        Ok(())
    }

    /// Re-render the status line with `text`, debounced
    ///
    /// Returns whether the line was actually rendered. Does nothing unless
    /// the reporter is running.
    pub fn tick(&mut self, text: impl Display) -> bool {
        if self.state != ReporterState::Running {
            return false;
        }

        let now = Instant::now();
        if let Some(last) = self.last_render {
            if now.duration_since(last) < self.config.min_render_interval {
                return false;
            }
        }

        if let Some(bar) = &self.bar {
            bar.set_message(text.to_string());
        }
        self.mark_rendered(now);
        true
    }

    /// Cancel the spinner and write `final_text` as a permanent line
    ///
    /// With `keep_status_line` the current status line stays on screen
    /// followed by a blank line; otherwise it is cleared first. Calling
    /// `stop` again only writes the text again.
    pub fn stop(&mut self, final_text: impl Display, keep_status_line: bool) {
        self.finish(final_text, keep_status_line, self.config.enabled);
    }

    /// Stop after a failure, keeping the status line
    ///
    /// Unlike [`stop`](Self::stop), `final_text` is printed even when the
    /// reporter is disabled, so quiet runs still show what went wrong.
    pub fn fail(&mut self, final_text: impl Display) {
        self.finish(final_text, true, true);
    }

    fn finish(&mut self, final_text: impl Display, keep_status_line: bool, print_final: bool) {
        if let Some(bar) = self.bar.take() {
            if keep_status_line {
                bar.abandon();
                if self.config.enabled && self.is_terminal {
                    println!();
                }
            } else {
                bar.finish_and_clear();
            }
        } else {
            debug!("Progress reporter stopped while not running");
        }

        self.state = ReporterState::Stopped;
        if print_final {
            println!("{}", final_text);
            self.final_lines += 1;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ReporterState::Running
    }

    /// Number of status renders so far, including the initial one
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Number of final lines written by `stop` and `fail`
    pub fn final_line_count(&self) -> u64 {
        self.final_lines
    }

    fn mark_rendered(&mut self, at: Instant) {
        self.last_render = Some(at);
        self.render_count += 1;
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
