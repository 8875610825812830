//! Pure statistics over pull request records.
//!
//! Everything in this module is arithmetic over in-memory lists; there is
//! no I/O and no failure path. Callers supply the reference time so the
//! results are deterministic under test.

use crate::github::{ClosedPullRequest, PullRequestRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// One repository's computed open-PR statistics.
///
/// The repository name and snapshot date are supplied by the caller when
/// the snapshot is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrStats {
    /// Number of open pull requests.
    pub total_prs: u64,
    /// Mean age in fractional days.
    pub avg_age_days: f64,
    /// Mean age with the single oldest PR left out. Equals `avg_age_days`
    /// when there is at most one PR.
    pub avg_age_days_excluding_oldest: f64,
    /// Mean comment count over all PRs.
    pub avg_comments: f64,
    /// Mean comment count over PRs that have at least one comment.
    pub avg_comments_with_comments: f64,
    /// Number of PRs with no comments at all.
    pub prs_with_zero_comments: u64,
    /// Number of PRs with at least one approving review.
    pub approved_prs: u64,
    /// Age in fractional days of the oldest PR.
    pub oldest_pr_age: f64,
    /// Title of the oldest PR, absent when there are no PRs.
    pub oldest_pr_title: Option<String>,
}

impl PrStats {
    /// The all-zero snapshot used for repositories with no open PRs.
    pub fn empty() -> Self {
        Self {
            total_prs: 0,
            avg_age_days: 0.0,
            avg_age_days_excluding_oldest: 0.0,
            avg_comments: 0.0,
            avg_comments_with_comments: 0.0,
            prs_with_zero_comments: 0,
            approved_prs: 0,
            oldest_pr_age: 0.0,
            oldest_pr_title: None,
        }
    }
}

/// Age of a record in fractional days at the reference time `now`.
pub fn age_days(record: &PullRequestRecord, now: DateTime<Utc>) -> f64 {
    (now - record.created_at).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Computes the open-PR snapshot for one repository.
pub fn aggregate(records: &[PullRequestRecord], now: DateTime<Utc>) -> PrStats {
    if records.is_empty() {
        return PrStats::empty();
    }

    let total = records.len();
    let ages: Vec<f64> = records.iter().map(|r| age_days(r, now)).collect();

    // First encountered wins on equal ages, so the choice is stable for a
    // fixed input order.
    let (oldest_idx, oldest_age) = ages
        .iter()
        .enumerate()
        .fold((0, ages[0]), |(best_idx, best_age), (idx, &age)| {
            if age > best_age {
                (idx, age)
            } else {
                (best_idx, best_age)
            }
        });

    let avg_age_days = ages.iter().sum::<f64>() / total as f64;

    // A single PR leaves nothing to exclude; report the plain average
    // rather than dividing by zero.
    let avg_age_days_excluding_oldest = if total == 1 {
        avg_age_days
    } else {
        let sum_excl: f64 = ages
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != oldest_idx)
            .map(|(_, age)| age)
            .sum();
        sum_excl / (total - 1) as f64
    };

    let total_comments: u64 = records.iter().map(|r| r.comments).sum();
    let avg_comments = total_comments as f64 / total as f64;

    let commented: Vec<u64> = records
        .iter()
        .filter(|r| r.comments > 0)
        .map(|r| r.comments)
        .collect();
    let avg_comments_with_comments = if commented.is_empty() {
        0.0
    } else {
        commented.iter().sum::<u64>() as f64 / commented.len() as f64
    };

    let prs_with_zero_comments = records.iter().filter(|r| r.comments == 0).count() as u64;
    let approved_prs = records.iter().filter(|r| r.approved).count() as u64;

    PrStats {
        total_prs: total as u64,
        avg_age_days,
        avg_age_days_excluding_oldest,
        avg_comments,
        avg_comments_with_comments,
        prs_with_zero_comments,
        approved_prs,
        oldest_pr_age: oldest_age,
        oldest_pr_title: Some(records[oldest_idx].title.clone()),
    }
}

/// Returns the PRs with zero comments that are ready for review and at
/// least `min_age_days` old, sorted by descending age.
pub fn stale_zero_comment_prs<'a>(
    records: &'a [PullRequestRecord],
    min_age_days: f64,
    now: DateTime<Utc>,
) -> Vec<&'a PullRequestRecord> {
    let mut stale: Vec<&PullRequestRecord> = records
        .iter()
        .filter(|r| r.comments == 0 && r.ready_for_review && age_days(r, now) >= min_age_days)
        .collect();

    stale.sort_by(|a, b| {
        age_days(b, now)
            .partial_cmp(&age_days(a, now))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    stale
}

/// Closed-PR figures for one repository over the analysis window.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedPrStats {
    pub total_closed: u64,
    pub avg_days_open: f64,
    pub std_dev_days: f64,
    /// Figures restricted to the tracked user, when one was given.
    pub user_total_closed: u64,
    pub user_avg_days_open: f64,
    pub user_std_dev_days: f64,
}

/// Computes closed-PR statistics, optionally tracking a single author.
pub fn aggregate_closed(records: &[ClosedPullRequest], user_login: Option<&str>) -> ClosedPrStats {
    let days_open: Vec<f64> = records
        .iter()
        .map(|r| (r.closed_at - r.created_at).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();

    let user_days_open: Vec<f64> = match user_login {
        Some(login) => records
            .iter()
            .filter(|r| r.author.as_deref() == Some(login))
            .map(|r| (r.closed_at - r.created_at).num_seconds() as f64 / SECONDS_PER_DAY)
            .collect(),
        None => Vec::new(),
    };

    ClosedPrStats {
        total_closed: days_open.len() as u64,
        avg_days_open: mean(&days_open),
        std_dev_days: std_dev(&days_open),
        user_total_closed: user_days_open.len() as u64,
        user_avg_days_open: mean(&user_days_open),
        user_std_dev_days: std_dev(&user_days_open),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation, 0 when fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(title: &str, age_days: i64, comments: u64, approved: bool) -> PullRequestRecord {
        let now = reference_time();
        PullRequestRecord {
            number: 1,
            title: title.to_string(),
            url: format!("https://github.com/test-org/repo/pull/{title}"),
            created_at: now - Duration::days(age_days),
            comments,
            approved,
            ready_for_review: true,
            draft: false,
        }
    }

    fn reference_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate(&[], reference_time());
        assert_eq!(stats, PrStats::empty());
        assert_eq!(stats.total_prs, 0);
        assert_eq!(stats.avg_age_days, 0.0);
        assert_eq!(stats.avg_comments, 0.0);
        assert_eq!(stats.oldest_pr_title, None);
    }

    #[test]
    fn test_aggregate_singleton_exclusion_equals_plain_average() {
        let records = vec![record("only", 4, 2, false)];
        let stats = aggregate(&records, reference_time());

        assert_eq!(stats.total_prs, 1);
        assert_eq!(stats.avg_age_days, 4.0);
        assert_eq!(stats.avg_age_days_excluding_oldest, stats.avg_age_days);
        assert_eq!(stats.oldest_pr_title.as_deref(), Some("only"));
    }

    #[test]
    fn test_aggregate_ages() {
        let records = vec![
            record("a", 1, 0, false),
            record("b", 2, 0, false),
            record("c", 3, 0, false),
            record("d", 4, 0, false),
        ];
        let stats = aggregate(&records, reference_time());

        assert_eq!(stats.avg_age_days, 2.5);
        assert_eq!(stats.avg_age_days_excluding_oldest, 2.0);
        assert_eq!(stats.oldest_pr_age, 4.0);
        assert_eq!(stats.oldest_pr_title.as_deref(), Some("d"));
    }

    #[test]
    fn test_aggregate_comments() {
        let records = vec![
            record("a", 1, 0, false),
            record("b", 1, 0, false),
            record("c", 1, 3, false),
            record("d", 1, 5, false),
        ];
        let stats = aggregate(&records, reference_time());

        assert_eq!(stats.avg_comments, 2.0);
        assert_eq!(stats.avg_comments_with_comments, 4.0);
        assert_eq!(stats.prs_with_zero_comments, 2);
    }

    #[test]
    fn test_aggregate_all_zero_comments() {
        let records = vec![
            record("a", 1, 0, false),
            record("b", 2, 0, false),
            record("c", 3, 0, false),
        ];
        let stats = aggregate(&records, reference_time());

        assert_eq!(stats.avg_comments, 0.0);
        assert_eq!(stats.avg_comments_with_comments, 0.0);
        assert_eq!(stats.prs_with_zero_comments, stats.total_prs);
    }

    #[test]
    fn test_aggregate_approved_count() {
        let records = vec![
            record("a", 1, 0, true),
            record("b", 2, 0, false),
            record("c", 3, 0, true),
        ];
        let stats = aggregate(&records, reference_time());
        assert_eq!(stats.approved_prs, 2);
    }

    #[test]
    fn test_oldest_tie_break_is_first_encountered() {
        let records = vec![
            record("first", 7, 0, false),
            record("second", 7, 0, false),
        ];
        let stats = aggregate(&records, reference_time());
        assert_eq!(stats.oldest_pr_title.as_deref(), Some("first"));
    }

    #[test]
    fn test_stale_filter_orders_by_descending_age() {
        let records = vec![
            record("young", 3, 0, false),
            record("older", 6, 0, false),
            record("oldest", 10, 0, false),
        ];
        let stale = stale_zero_comment_prs(&records, 5.0, reference_time());

        let titles: Vec<&str> = stale.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["oldest", "older"]);
    }

    #[test]
    fn test_stale_filter_excludes_commented_and_draft() {
        let mut draft = record("draft", 9, 0, false);
        draft.draft = true;
        draft.ready_for_review = false;

        let records = vec![
            record("discussed", 9, 4, false),
            draft,
            record("quiet", 9, 0, false),
        ];
        let stale = stale_zero_comment_prs(&records, 0.0, reference_time());

        let titles: Vec<&str> = stale.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["quiet"]);
    }

    fn closed(author: &str, days_open: i64) -> ClosedPullRequest {
        let closed_at = reference_time();
        ClosedPullRequest {
            number: 1,
            created_at: closed_at - Duration::days(days_open),
            closed_at,
            author: Some(author.to_string()),
        }
    }

    #[test]
    fn test_aggregate_closed_empty() {
        let stats = aggregate_closed(&[], None);
        assert_eq!(stats.total_closed, 0);
        assert_eq!(stats.avg_days_open, 0.0);
        assert_eq!(stats.std_dev_days, 0.0);
    }

    #[test]
    fn test_aggregate_closed_single_pr_has_zero_deviation() {
        let stats = aggregate_closed(&[closed("alice", 4)], None);
        assert_eq!(stats.total_closed, 1);
        assert_eq!(stats.avg_days_open, 4.0);
        assert_eq!(stats.std_dev_days, 0.0);
    }

    #[test]
    fn test_aggregate_closed_with_user_filter() {
        let records = vec![closed("alice", 2), closed("bob", 4), closed("alice", 6)];
        let stats = aggregate_closed(&records, Some("alice"));

        assert_eq!(stats.total_closed, 3);
        assert_eq!(stats.avg_days_open, 4.0);
        assert_eq!(stats.user_total_closed, 2);
        assert_eq!(stats.user_avg_days_open, 4.0);
        // Sample deviation of [2, 6].
        assert!((stats.user_std_dev_days - std::f64::consts::SQRT_2 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_std_dev_matches_sample_formula() {
        // Sample std-dev of [1, 2, 3, 4] is sqrt(5/3).
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((std_dev(&values) - (5.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }
}
