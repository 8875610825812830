pub mod cli;
pub mod compare;
pub mod config;
pub mod github;
pub mod graph;
pub mod report;
pub mod stats;
pub mod store;

use chrono::{Duration, NaiveDate, Utc};
use cli::{ClosedArgs, ReportArgs};
use config::Config;
use github::GithubClient;
use std::path::Path;
use store::HistoryStore;

/// A comparison or `--dbonly` lookup found no stored snapshot.
#[derive(Debug, thiserror::Error)]
#[error("no historical data for {repo} on {date}")]
pub struct NoHistoricalData {
    pub repo: String,
    pub date: NaiveDate,
}

/// Composition point for a run: configuration, the GitHub client, and the
/// snapshot store, built once and dropped together at the end.
pub struct Reporter {
    config: Config,
    client: GithubClient,
    store: HistoryStore,
}

impl Reporter {
    pub fn new(config: Config, db_path: &Path) -> anyhow::Result<Self> {
        let client = GithubClient::new(config.auth_token(), config.github.url.as_deref())?;
        let store = HistoryStore::open(db_path)?;
        Ok(Self {
            config,
            client,
            store,
        })
    }

    /// Generates the open-PR report, persisting today's snapshot for each
    /// repository along the way.
    ///
    /// Repositories are processed one at a time; a failure on any of them
    /// fails the whole run.
    pub async fn run_report(&self, args: &ReportArgs) -> anyhow::Result<String> {
        let now = Utc::now();
        let today = now.date_naive();
        let org = self.config.org().to_string();
        let repos = self.select_repos(args.repo.as_deref())?;

        if !args.dbonly {
            self.client.verify_org(&org).await?;
        }

        let mut out = report::report_header();

        for (i, repo) in repos.iter().enumerate() {
            tracing::info!(repo = %repo, "processing repository {}/{}", i + 1, repos.len());

            let (stats, records) = if args.dbonly {
                let stats = self.store.load(repo, today)?.ok_or(NoHistoricalData {
                    repo: repo.clone(),
                    date: today,
                })?;
                (stats, Vec::new())
            } else {
                let records = self.client.fetch_open_pull_requests(&org, repo).await?;
                let stats = stats::aggregate(&records, now);
                self.store.save(repo, today, &stats)?;
                (stats, records)
            };

            let deltas = match args.compare {
                Some(days) => {
                    let prev_date = today - Duration::days(days);
                    let previous = self.store.load(repo, prev_date)?.ok_or(NoHistoricalData {
                        repo: repo.clone(),
                        date: prev_date,
                    })?;
                    Some(compare::compare(&stats, &previous))
                }
                None => None,
            };

            out.push_str(&report::render_repo_report(repo, &stats, deltas.as_deref()));

            if args.verbose && !args.dbonly {
                let min_age = args.min_age as f64;
                let stale = stats::stale_zero_comment_prs(&records, min_age, now);
                out.push_str(&report::render_stale_prs(&stale, min_age, now));
            }
        }

        if args.graph {
            let path = graph::render_trends(
                &self.store,
                args.repo.as_deref(),
                args.days,
                today,
                Path::new("."),
            )?;
            out.push_str(&format!("\nWrote graph: {}\n", path.display()));
        }

        Ok(out)
    }

    /// Analyzes recently closed PRs across the configured repositories.
    pub async fn run_closed(&self, args: &ClosedArgs) -> anyhow::Result<String> {
        let org = self.config.org().to_string();
        self.client.verify_org(&org).await?;

        let repos = self.select_repos(None)?;
        let mut results = Vec::new();
        let mut debug_out = String::new();

        for (i, repo) in repos.iter().enumerate() {
            tracing::info!(repo = %repo, "analyzing repository {}/{}", i + 1, repos.len());

            let records = self
                .client
                .fetch_closed_pull_requests(&org, repo, args.days)
                .await?;

            if args.debug {
                debug_out.push_str(&report::render_closed_debug(repo, &records));
            }

            results.push((
                repo.clone(),
                stats::aggregate_closed(&records, args.user.as_deref()),
            ));
        }

        // Debug mode shows the raw listing instead of the summary report.
        if args.debug {
            Ok(debug_out)
        } else {
            Ok(report::render_closed_report(
                &results,
                args.days,
                args.user.as_deref(),
            ))
        }
    }

    /// Lists organization members with their public emails.
    pub async fn run_emails(&self) -> anyhow::Result<String> {
        let org = self.config.org().to_string();
        self.client.verify_org(&org).await?;

        let members = self.client.list_org_members(&org).await?;
        tracing::info!(count = members.len(), "fetched organization members");

        let mut profiles = Vec::with_capacity(members.len());
        for member in &members {
            profiles.push(self.client.user_profile(&member.login).await?);
        }

        Ok(report::render_members(&org, &profiles))
    }

    fn select_repos(&self, filter: Option<&str>) -> anyhow::Result<Vec<String>> {
        let repos = &self.config.github.repos;
        match filter {
            Some(name) => {
                if repos.iter().any(|r| r == name) {
                    Ok(vec![name.to_string()])
                } else {
                    anyhow::bail!("repository '{name}' is not listed in the config file")
                }
            }
            None => Ok(repos.clone()),
        }
    }
}
