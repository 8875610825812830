//! Trend graph rendering.
//!
//! Plots the open-PR count per day over a trailing window, one line per
//! repository, from the snapshots in the history store.

use crate::store::{HistoryStore, SnapshotRow};
use crate::NoHistoricalData;
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const GRAPH_SIZE: (u32, u32) = (1024, 768);

/// File name for a trend graph: `{repo|all_repos}_pr_trends_{date}.png`.
pub fn graph_file_name(repo: Option<&str>, date: NaiveDate) -> String {
    format!(
        "{}_pr_trends_{}.png",
        repo.unwrap_or("all_repos"),
        date.format("%Y-%m-%d")
    )
}

/// Renders the trend graph for the trailing `window_days` ending at
/// `today` and returns the path of the written PNG.
pub fn render_trends(
    store: &HistoryStore,
    repo: Option<&str>,
    window_days: i64,
    today: NaiveDate,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let since = today - Duration::days(window_days);
    let rows = store.load_range(repo, since)?;

    if rows.is_empty() {
        return Err(NoHistoricalData {
            repo: repo.unwrap_or("all repositories").to_string(),
            date: since,
        }
        .into());
    }

    let series = group_by_repo(rows);
    let max_count = series
        .values()
        .flat_map(|points| points.iter().map(|(_, count)| *count))
        .max()
        .unwrap_or(0)
        .max(1);

    let path = out_dir.join(graph_file_name(repo, today));
    let backend_path = path.clone();

    let root = BitMapBackend::new(&backend_path, GRAPH_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Open PR Trends", ("sans-serif", 30))
        .margin(16)
        .x_label_area_size(44)
        .y_label_area_size(44)
        .build_cartesian_2d(since..today, 0u64..max_count + 1)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|date| date.format("%m-%d").to_string())
        .y_desc("Open PRs")
        .draw()?;

    for (idx, (repo_name, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(repo_name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    tracing::info!(path = %path.display(), "wrote trend graph");

    Ok(path)
}

fn group_by_repo(rows: Vec<SnapshotRow>) -> BTreeMap<String, Vec<(NaiveDate, u64)>> {
    let mut series: BTreeMap<String, Vec<(NaiveDate, u64)>> = BTreeMap::new();
    for row in rows {
        series
            .entry(row.repo_name)
            .or_default()
            .push((row.date, row.stats.total_prs));
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(
            graph_file_name(Some("repo1"), date),
            "repo1_pr_trends_2024-06-01.png"
        );
        assert_eq!(
            graph_file_name(None, date),
            "all_repos_pr_trends_2024-06-01.png"
        );
    }
}
