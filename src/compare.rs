//! Day-over-day snapshot comparison.
//!
//! Each metric carries a fixed polarity describing whether growth is
//! favorable. The comparison walks a declarative table, so adding a metric
//! means adding a row here and nothing else.

use crate::stats::PrStats;
use colored::Color;

/// Whether a rising value is good news or bad news for a metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Growth is unfavorable (open PR counts, ages, silence).
    HigherIsWorse,
    /// Growth is favorable (approvals, discussion).
    HigherIsBetter,
}

/// Which way a metric moved between the two snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// One row of the comparison output.
#[derive(Clone, Debug)]
pub struct MetricDelta {
    pub name: &'static str,
    pub current: f64,
    pub previous: f64,
    pub direction: Direction,
    pub polarity: Polarity,
}

impl MetricDelta {
    /// Color annotation for the rendered report: red for an unfavorable
    /// move, green for a favorable one, none when unchanged.
    pub fn color(&self) -> Option<Color> {
        let favorable = match (self.direction, self.polarity) {
            (Direction::Flat, _) => return None,
            (Direction::Up, Polarity::HigherIsBetter) => true,
            (Direction::Up, Polarity::HigherIsWorse) => false,
            (Direction::Down, Polarity::HigherIsBetter) => false,
            (Direction::Down, Polarity::HigherIsWorse) => true,
        };
        Some(if favorable { Color::Green } else { Color::Red })
    }
}

type MetricExtractor = fn(&PrStats) -> f64;

/// The comparison table: display name, how to read the value out of a
/// snapshot, and the metric's polarity.
const METRICS: &[(&str, MetricExtractor, Polarity)] = &[
    ("Total Open PRs", |s| s.total_prs as f64, Polarity::HigherIsWorse),
    ("Average PR Age (days)", |s| s.avg_age_days, Polarity::HigherIsWorse),
    (
        "Average PR Age Excluding Oldest (days)",
        |s| s.avg_age_days_excluding_oldest,
        Polarity::HigherIsWorse,
    ),
    ("Average Comments per PR", |s| s.avg_comments, Polarity::HigherIsBetter),
    (
        "Average Comments per Commented PR",
        |s| s.avg_comments_with_comments,
        Polarity::HigherIsBetter,
    ),
    (
        "PRs with Zero Comments",
        |s| s.prs_with_zero_comments as f64,
        Polarity::HigherIsWorse,
    ),
    ("Approved PRs", |s| s.approved_prs as f64, Polarity::HigherIsBetter),
    ("Oldest PR Age (days)", |s| s.oldest_pr_age, Polarity::HigherIsWorse),
];

/// Compares a current snapshot against a historical one, metric by metric.
pub fn compare(current: &PrStats, previous: &PrStats) -> Vec<MetricDelta> {
    METRICS
        .iter()
        .map(|(name, extract, polarity)| {
            let current_value = extract(current);
            let previous_value = extract(previous);
            let direction = if current_value > previous_value {
                Direction::Up
            } else if current_value < previous_value {
                Direction::Down
            } else {
                Direction::Flat
            };

            MetricDelta {
                name,
                current: current_value,
                previous: previous_value,
                direction,
                polarity: *polarity,
            }
        })
        .collect()
}

/// Looks up the delta for a metric by display name.
pub fn delta_for<'a>(deltas: &'a [MetricDelta], name: &str) -> Option<&'a MetricDelta> {
    deltas.iter().find(|d| d.name == name)
}
