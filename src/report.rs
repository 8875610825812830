//! Console report rendering.
//!
//! All functions build and return strings so the exact output can be
//! asserted in tests; the CLI prints them as-is.

use crate::compare::{delta_for, MetricDelta};
use crate::github::{PullRequestRecord, UserProfile};
use crate::stats::{age_days, ClosedPrStats, PrStats};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt::Write;

pub fn report_header() -> String {
    format!("\nGitHub PR Report\n{}", "=".repeat(50))
}

/// Renders the per-repository metric block, annotating each line with the
/// previous value when a comparison is available.
pub fn render_repo_report(repo: &str, stats: &PrStats, deltas: Option<&[MetricDelta]>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nRepository: {repo}");
    let _ = writeln!(
        out,
        "Total Open PRs: {}{}",
        stats.total_prs,
        annotation(deltas, "Total Open PRs")
    );
    let _ = writeln!(
        out,
        "Average PR Age: {:.1} days{}",
        stats.avg_age_days,
        annotation(deltas, "Average PR Age (days)")
    );
    let _ = writeln!(
        out,
        "Average PR Age Excluding Oldest: {:.1} days{}",
        stats.avg_age_days_excluding_oldest,
        annotation(deltas, "Average PR Age Excluding Oldest (days)")
    );
    let _ = writeln!(
        out,
        "Average Comments per PR: {:.1}{}",
        stats.avg_comments,
        annotation(deltas, "Average Comments per PR")
    );
    let _ = writeln!(
        out,
        "Average Comments per Commented PR: {:.1}{}",
        stats.avg_comments_with_comments,
        annotation(deltas, "Average Comments per Commented PR")
    );
    let _ = writeln!(
        out,
        "PRs with Zero Comments: {}{}",
        stats.prs_with_zero_comments,
        annotation(deltas, "PRs with Zero Comments")
    );
    let _ = writeln!(
        out,
        "Approved PRs: {}{}",
        stats.approved_prs,
        annotation(deltas, "Approved PRs")
    );

    if let Some(title) = &stats.oldest_pr_title {
        let _ = writeln!(
            out,
            "Oldest PR: {title} ({:.1} days old){}",
            stats.oldest_pr_age,
            annotation(deltas, "Oldest PR Age (days)")
        );
    }

    out
}

fn annotation(deltas: Option<&[MetricDelta]>, name: &str) -> String {
    let Some(delta) = deltas.and_then(|d| delta_for(d, name)) else {
        return String::new();
    };

    let text = format!("(prev: {})", format_value(delta.previous));
    match delta.color() {
        Some(color) => format!(" {}", text.color(color)),
        None => format!(" {text}"),
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Renders the verbose listing of stale zero-comment PRs.
pub fn render_stale_prs(
    stale: &[&PullRequestRecord],
    min_age_days: f64,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    if stale.is_empty() {
        let _ = writeln!(
            out,
            "\nNo PRs without comments older than {min_age_days:.0} days."
        );
        return out;
    }

    let _ = writeln!(out, "\nPRs ready for review with no comments:");
    for pr in stale {
        let _ = writeln!(
            out,
            "  #{} {} ({:.1} days old)\n    {}",
            pr.number,
            pr.title,
            age_days(pr, now),
            pr.url
        );
    }

    out
}

/// Renders the closed-PR analysis report, with per-user sections when a
/// login filter was given and overall totals at the end.
pub fn render_closed_report(
    report: &[(String, ClosedPrStats)],
    days: i64,
    user: Option<&str>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nClosed PR Analysis Report");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Period: Last {days} days");
    if let Some(user) = user {
        let _ = writeln!(out, "Tracking user: {user}");
    }
    let _ = writeln!(out, "{}", "=".repeat(50));

    for (repo_name, stats) in report {
        let _ = writeln!(out, "\nRepository: {repo_name}");
        let _ = writeln!(out, "Total Closed PRs: {}", stats.total_closed);
        if stats.total_closed > 0 {
            let _ = writeln!(out, "Average Days Open: {:.1}", stats.avg_days_open);
            let _ = writeln!(out, "Standard Deviation: {:.1}", stats.std_dev_days);
        }

        if let Some(user) = user {
            let _ = writeln!(out, "\nStatistics for {user}:");
            let _ = writeln!(out, "Closed PRs: {}", stats.user_total_closed);
            if stats.user_total_closed > 0 {
                let _ = writeln!(out, "Average Days Open: {:.1}", stats.user_avg_days_open);
                let _ = writeln!(out, "Standard Deviation: {:.1}", stats.user_std_dev_days);
            }
        }
    }

    let total_closed: u64 = report.iter().map(|(_, s)| s.total_closed).sum();
    let _ = writeln!(out, "\nOverall Statistics");
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "Total Closed PRs: {total_closed}");
    if total_closed > 0 {
        let weighted: f64 = report
            .iter()
            .map(|(_, s)| s.avg_days_open * s.total_closed as f64)
            .sum();
        let _ = writeln!(
            out,
            "Overall Average Days Open: {:.1}",
            weighted / total_closed as f64
        );
    }

    if let Some(user) = user {
        let user_total: u64 = report.iter().map(|(_, s)| s.user_total_closed).sum();
        let _ = writeln!(out, "\nOverall Statistics for {user}");
        let _ = writeln!(out, "Total Closed PRs: {user_total}");
        if user_total > 0 {
            let weighted: f64 = report
                .iter()
                .map(|(_, s)| s.user_avg_days_open * s.user_total_closed as f64)
                .sum();
            let _ = writeln!(
                out,
                "Average Days Open: {:.1}",
                weighted / user_total as f64
            );
        }
    }

    out
}

/// Renders the per-PR listing shown by `closed --debug`.
pub fn render_closed_debug(repo: &str, records: &[crate::github::ClosedPullRequest]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nDetailed PR Information for {repo}:");
    let _ = writeln!(out, "{}", "-".repeat(80));
    let _ = writeln!(
        out,
        "{:<6} {:<20} {:<20} {:<12} {:<30}",
        "PR #", "Opened", "Closed", "Days Open", "Author"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));

    for pr in records {
        let days_open = (pr.closed_at - pr.created_at).num_seconds() as f64 / (24.0 * 3600.0);
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:<20} {:<12.1} {:<30}",
            pr.number,
            pr.created_at.format("%Y-%m-%d %H:%M"),
            pr.closed_at.format("%Y-%m-%d %H:%M"),
            days_open,
            pr.author.as_deref().unwrap_or("N/A")
        );
    }

    out
}

/// Renders the organization member email table.
pub fn render_members(org: &str, profiles: &[UserProfile]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nMembers of organization: {org}");
    let _ = writeln!(out, "{:<30} {:<40}", "GitHub Login", "Public Email");
    let _ = writeln!(out, "{}", "-".repeat(70));

    for profile in profiles {
        let email = profile.email.as_deref().unwrap_or("Not publicly available");
        let _ = writeln!(out, "{:<30} {:<40}", profile.login, email);
    }

    out
}
