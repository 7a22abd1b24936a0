//! Console output helpers.
//!
//! The report (comment line, JSON, `OK`) goes to stdout. Warnings, failures
//! and the progress bar go to stderr so the report can be piped cleanly.

use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};

/// Console writer honouring `--quiet` and the `--color` choice.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    quiet: bool,
    verbose: bool,
}

impl Console {
    /// Build a console for the given verbosity flags.
    pub const fn new(quiet: bool, verbose: bool) -> Self {
        Self { quiet, verbose }
    }

    /// Whether `--quiet` was given.
    pub const fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether verbose-only output is shown.
    pub const fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Yellow `Warning: ` line on stderr, suppressed by `--quiet`.
    pub fn warn(&self, message: &str) {
        if self.quiet {
            return;
        }
        let line = warning_line(message);
        eprintln!("{}", line.if_supports_color(Stream::Stderr, |m| m.yellow()));
    }

    /// Red `Error: ` line on stderr. Always shown.
    pub fn fail(&self, message: &str) {
        let line = error_line(message);
        eprintln!("{}", line.if_supports_color(Stream::Stderr, |m| m.red()));
    }

    /// A line on stdout shown only in verbose mode.
    pub fn verbose(&self, message: &str) {
        if self.is_verbose() {
            println!("{message}");
        }
    }

    /// Plain stdout line.
    pub fn print(&self, message: &str) {
        println!("{message}");
    }

    /// Green success marker on stdout.
    pub fn ok(&self, message: &str) {
        println!(
            "{}",
            message.if_supports_color(Stream::Stdout, |m| m.green())
        );
        let _ = std::io::stdout().flush();
    }
}

fn warning_line(message: &str) -> String {
    format!("Warning: {message}")
}

fn error_line(message: &str) -> String {
    format!("Error: {message}")
}

/// Per-user progress bar over the org listing.
#[derive(Debug)]
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// A bar on stderr, or a hidden one when `enabled` is false.
    ///
    /// indicatif also hides the bar when stderr is not a terminal.
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let style = ProgressStyle::with_template("  {msg:<16} [{bar:40.cyan/blue}] {pos:>4}/{len:4}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
            ProgressBar::new(0).with_style(style)
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    /// Reset the bar for a new user.
    pub fn start_user(&self, user: &str, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_message(user.to_string());
    }

    /// Move to the one-based `index`.
    pub fn visit(&self, index: usize) {
        self.bar.set_position(index as u64);
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
