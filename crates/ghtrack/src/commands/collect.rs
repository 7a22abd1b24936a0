//! The counting subcommands. Thin CLI layer over `ghtrack_core::command`.

use std::path::PathBuf;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use tracing::{debug, instrument};

use ghtrack_core::command::{CollectError, CollectEvent, Outcome, Plan, Subcommand};
use ghtrack_core::config::Config;
use ghtrack_core::credentials::load_credentials;
use ghtrack_core::github::{GithubClient, GithubSettings};
use ghtrack_core::month::current_year;
use ghtrack_core::options::{Options, RawOptions};
use ghtrack_core::report::{OK_MARKER, comment_line, render_json};

use crate::terminal::{Console, Progress};

/// Arguments shared by every counting subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct StatsArgs {
    /// Month name: March, march, MARCH or mar
    #[arg(value_name = "MONTH")]
    pub month: String,

    /// Organization that owns the repositories
    #[arg(value_name = "ORG")]
    pub org: String,

    /// Users to report on (comma separated)
    #[arg(long, value_name = "LIST")]
    pub users: Option<String>,

    /// Repositories to report on (comma separated)
    #[arg(long, value_name = "LIST")]
    pub repos: Option<String>,

    /// Report on every repository in the org (ignores --repos)
    #[arg(long)]
    pub all_repos: bool,

    /// Repositories to leave out (comma separated)
    #[arg(long, value_name = "LIST")]
    pub skip_repos: Option<String>,

    /// Credentials file holding `access_token` (default: .ghtrack.yml)
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Access token, used instead of the credentials file's token
    #[arg(long, value_name = "TOKEN", env = "GHTRACK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

impl StatsArgs {
    /// Normalized list options.
    pub fn options(&self) -> Options {
        RawOptions {
            users: self.users.clone().into(),
            repos: self.repos.clone().into(),
            skip_repos: self.skip_repos.clone().into(),
            all_repos: self.all_repos,
        }
        .normalize()
    }
}

/// Execute a counting subcommand.
#[instrument(name = "cmd_collect", skip_all, fields(subcommand = %subcommand))]
pub fn cmd_collect(
    subcommand: Subcommand,
    args: StatsArgs,
    global_json: bool,
    console: Console,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    let options = args.options();
    debug!(?options, json_output = global_json, "executing collect command");

    let plan = Plan::prepare(subcommand, &args.month, &args.org, options, current_year())?;

    let flag_path = args
        .credentials
        .map(|path| {
            Utf8PathBuf::try_from(path).map_err(|e| {
                anyhow::anyhow!(
                    "credentials path is not valid UTF-8: {}",
                    e.into_path_buf().display()
                )
            })
        })
        .transpose()?;
    let credentials_path = config.credentials_path(flag_path.as_deref(), cwd);
    let credentials = load_credentials(&credentials_path, args.access_token.as_deref())
        .context("failed to load credentials")?;
    debug!(source = ?credentials.source(), "credentials loaded");

    let client = GithubClient::new(&credentials, GithubSettings::from(config));

    if !global_json {
        console.verbose(&comment_line(
            subcommand,
            &args.month,
            &plan.org,
            &plan.options,
        ));
    }

    let progress = Progress::new(!global_json && !console.is_quiet());
    let result = plan.execute(&client, |event| match event {
        CollectEvent::ExplicitReposIgnored { repos } => {
            debug!(?repos, "explicit repos ignored");
            console.warn("ignoring --repos since --all-repos is set");
        }
        CollectEvent::Started {
            kind,
            users,
            requested,
            ..
        } => console.warn(&format!(
            "getting {kind} for {users} users in {requested} repos via GitHub APIs... be patient"
        )),
        CollectEvent::UserStarted { user, total } => progress.start_user(&user, total),
        CollectEvent::RepoVisited { index, .. } => progress.visit(index),
        CollectEvent::UserFinished { user, total } => debug!(%user, total, "user finished"),
    });
    progress.finish();

    match result {
        Ok(Outcome::Counts { stats, .. }) => {
            let rendered = render_json(&stats).context("failed to render report")?;
            if global_json {
                console.print(&rendered);
            } else {
                console.print("");
                console.print(&rendered);
                console.ok(OK_MARKER);
            }
            Ok(())
        }
        Ok(Outcome::NoOp) => {
            if global_json {
                console.print("{}");
            } else {
                console.ok(OK_MARKER);
            }
            Ok(())
        }
        Err(err) => {
            if let CollectError::Remote { partial, .. } = &err
                && !partial.is_empty()
            {
                let rendered = render_json(partial).context("failed to render partial report")?;
                console.fail("partial results before the failure:");
                eprintln!("{rendered}");
            }
            Err(err).context(format!("{subcommand} failed"))
        }
    }
}
