//! Report rendering.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::command::Subcommand;
use crate::options::Options;

const INDENT: &[u8] = b"    ";

/// Success marker printed after the report.
pub const OK_MARKER: &str = "OK";

/// Reconstruct the command line that reproduces a run.
pub fn command_line(subcommand: Subcommand, month: &str, org: &str, options: &Options) -> String {
    let repos = if options.all_repos {
        "--all-repos".to_string()
    } else {
        format!(
            "--repos={} --skip-repos={}",
            options.repos.join(","),
            options.skip_repos.join(",")
        )
    };
    format!(
        "{} {month} {org} --users={} {repos}",
        subcommand.name(),
        options.users.join(",")
    )
}

/// The provenance comment printed ahead of a verbose run.
pub fn comment_line(subcommand: Subcommand, month: &str, org: &str, options: &Options) -> String {
    format!(
        "# GH Track output for cmd line: {}",
        command_line(subcommand, month, org, options)
    )
}

/// Serialize `value` as JSON with four-space indentation.
///
/// Key order follows the value's own ordering; the accumulator is backed
/// by sorted maps.
///
/// # Errors
///
/// Returns the serializer's error when `value` cannot be represented.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
