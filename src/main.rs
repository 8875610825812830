use clap::Parser;
use pr_reporter::cli::{Cli, Command};
use pr_reporter::config::{Config, ConfigError};
use pr_reporter::github::GithubError;
use pr_reporter::{NoHistoricalData, Reporter};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_reporter=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{}", render_error(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // CONFIG_PATH overrides the --config flag.
    let config_path = match std::env::var_os("CONFIG_PATH") {
        Some(p) => PathBuf::from(p),
        None => cli.config.clone(),
    };
    let config = Config::load(&config_path)?;

    let reporter = Reporter::new(config, &cli.db_path)?;

    let output = match &cli.command {
        Some(Command::Closed(args)) => reporter.run_closed(args).await?,
        Some(Command::Emails) => reporter.run_emails().await?,
        None => reporter.run_report(&cli.report).await?,
    };

    println!("{output}");
    Ok(())
}

/// Renders a run failure as a message with a remediation hint.
fn render_error(err: &anyhow::Error) -> String {
    if let Some(config_err) = err.downcast_ref::<ConfigError>() {
        let hint = match config_err {
            ConfigError::NotFound(_) => {
                "Create a config.yaml with a 'github' section (org, auth_token, repos),\n\
                 or point --config / CONFIG_PATH at an existing file."
            }
            ConfigError::Malformed(_) => "Fix the YAML syntax in the config file.",
            ConfigError::MissingField(_) => {
                "Add the missing field to the 'github' section of the config file."
            }
            ConfigError::Io(_) => "Check that the config file is readable.",
        };
        return format!("Error: {config_err}\n{hint}");
    }

    if let Some(github_err) = err.downcast_ref::<GithubError>() {
        let hint = match github_err {
            GithubError::AuthInvalid => {
                "Check the 'github.auth_token' value in your config file; the token\n\
                 may have expired or lack the required scopes."
            }
            GithubError::OrgNotFound(_) => {
                "Check the 'github.org' value in your config file and that the token\n\
                 has access to the organization."
            }
            GithubError::RepoNotFound(_) => {
                "Check the 'github.repos' list in your config file."
            }
            GithubError::Api(_) => "The GitHub API request failed; try again later.",
        };
        return format!("Error: {github_err}\n{hint}");
    }

    if let Some(missing) = err.downcast_ref::<NoHistoricalData>() {
        return format!(
            "Error: {missing}\n\
             Run the report without --dbonly/--compare first so a snapshot is recorded."
        );
    }

    format!("Error: {err:#}")
}
