use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pr_reporter::compare::{compare, delta_for, Direction};
use pr_reporter::github::PullRequestRecord;
use pr_reporter::report;
use pr_reporter::stats::{aggregate, stale_zero_comment_prs, PrStats};
use pr_reporter::store::HistoryStore;

fn record(title: &str, age_days: i64, comments: u64, approved: bool) -> PullRequestRecord {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    PullRequestRecord {
        number: 1,
        title: title.to_string(),
        url: format!("https://github.com/test-org/repo1/pull/{title}"),
        created_at: now - Duration::days(age_days),
        comments,
        approved,
        ready_for_review: true,
        draft: false,
    }
}

#[test]
fn test_aggregate_save_load_compare_pipeline() {
    // 1. Aggregate a day's worth of PRs
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let records = vec![
        record("a", 1, 0, false),
        record("b", 2, 3, true),
        record("c", 4, 5, false),
    ];
    let today_stats = aggregate(&records, now);
    assert_eq!(today_stats.total_prs, 3);

    // 2. Persist it next to an older snapshot
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("pr_stats.db")).unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let week_ago = today - Duration::days(7);

    let mut old_stats = today_stats.clone();
    old_stats.total_prs = 1;
    old_stats.approved_prs = 2;

    store.save("repo1", week_ago, &old_stats).unwrap();
    store.save("repo1", today, &today_stats).unwrap();

    // 3. Read the historical snapshot back and compare
    let previous = store.load("repo1", week_ago).unwrap().expect("snapshot");
    let deltas = compare(&today_stats, &previous);

    let total = delta_for(&deltas, "Total Open PRs").unwrap();
    assert_eq!(total.direction, Direction::Up);
    assert_eq!(total.current, 3.0);
    assert_eq!(total.previous, 1.0);

    let approved = delta_for(&deltas, "Approved PRs").unwrap();
    assert_eq!(approved.direction, Direction::Down);

    // 4. The rendered report carries the comparison annotations
    let out = report::render_repo_report("repo1", &today_stats, Some(&deltas));
    assert!(out.contains("Total Open PRs: 3"));
    assert!(out.contains("prev: 1"));
}

#[test]
fn test_verbose_listing_matches_filter() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let records = vec![
        record("young", 3, 0, false),
        record("older", 6, 0, false),
        record("oldest", 10, 0, false),
        record("discussed", 12, 2, false),
    ];

    let stale = stale_zero_comment_prs(&records, 5.0, now);
    let out = report::render_stale_prs(&stale, 5.0, now);

    assert!(out.contains("oldest"));
    assert!(out.contains("older"));
    assert!(!out.contains("young"));
    assert!(!out.contains("discussed"));
    assert!(out.find("oldest").unwrap() < out.find("older (").unwrap_or(usize::MAX));
}

#[test]
fn test_snapshot_serialization_contract() {
    // The snapshot's serialized field names are part of the tool's output
    // surface; renames here break downstream consumers of exported data.
    let stats = PrStats {
        total_prs: 5,
        avg_age_days: 4.5,
        avg_age_days_excluding_oldest: 3.0,
        avg_comments: 1.2,
        avg_comments_with_comments: 3.0,
        prs_with_zero_comments: 2,
        approved_prs: 1,
        oldest_pr_age: 12.25,
        oldest_pr_title: Some("Rework pagination".to_string()),
    };

    let json = serde_json::to_value(&stats).unwrap();

    assert_eq!(json["total_prs"], 5);
    assert_eq!(json["avg_age_days"], 4.5);
    assert_eq!(json["avg_age_days_excluding_oldest"], 3.0);
    assert_eq!(json["avg_comments"], 1.2);
    assert_eq!(json["avg_comments_with_comments"], 3.0);
    assert_eq!(json["prs_with_zero_comments"], 2);
    assert_eq!(json["approved_prs"], 1);
    assert_eq!(json["oldest_pr_age"], 12.25);
    assert_eq!(json["oldest_pr_title"], "Rework pagination");

    let roundtrip: PrStats = serde_json::from_value(json).unwrap();
    assert_eq!(roundtrip, stats);
}
