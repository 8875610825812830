//! SQLite-backed snapshot history.
//!
//! One table keyed by `(repo_name, date)`, one row per repository per day.
//! Re-running on the same day replaces the prior row. Databases created by
//! older versions of the tool are upgraded in place by adding any missing
//! columns on open.

use crate::stats::PrStats;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised by the history store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("invalid date in history store: {0}")]
    InvalidDate(String),
}

/// One persisted snapshot row.
#[derive(Clone, Debug)]
pub struct SnapshotRow {
    pub repo_name: String,
    pub date: NaiveDate,
    pub stats: PrStats,
}

/// Handle to the snapshot database.
///
/// Constructed explicitly by the caller and dropped at end of run; the
/// connection closes with it.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Opens (creating if necessary) the snapshot database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.create_table()?;
        store.migrate_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.create_table()?;
        store.migrate_schema()?;
        Ok(store)
    }

    fn create_table(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pr_stats (
                repo_name TEXT NOT NULL,
                date TEXT NOT NULL,
                total_prs INTEGER NOT NULL DEFAULT 0,
                avg_age_days REAL NOT NULL DEFAULT 0,
                avg_age_days_excluding_oldest REAL NOT NULL DEFAULT 0,
                avg_comments REAL NOT NULL DEFAULT 0,
                avg_comments_with_comments REAL NOT NULL DEFAULT 0,
                approved_prs INTEGER NOT NULL DEFAULT 0,
                oldest_pr_age REAL NOT NULL DEFAULT 0,
                oldest_pr_title TEXT,
                prs_with_zero_comments INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (repo_name, date)
            )",
        )?;
        Ok(())
    }

    /// Adds columns introduced after a database was first created.
    fn migrate_schema(&self) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(pr_stats)")?;
        let existing: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        let wanted: &[(&str, &str)] = &[
            ("avg_age_days_excluding_oldest", "REAL NOT NULL DEFAULT 0"),
            ("avg_comments_with_comments", "REAL NOT NULL DEFAULT 0"),
            ("oldest_pr_age", "REAL NOT NULL DEFAULT 0"),
            ("oldest_pr_title", "TEXT"),
            ("prs_with_zero_comments", "INTEGER NOT NULL DEFAULT 0"),
        ];

        for (column, definition) in wanted {
            if !existing.iter().any(|c| c == column) {
                tracing::info!(column, "adding missing column to pr_stats");
                self.conn.execute_batch(&format!(
                    "ALTER TABLE pr_stats ADD COLUMN {column} {definition}"
                ))?;
            }
        }

        Ok(())
    }

    /// Inserts or replaces the snapshot for `(repo, date)`.
    pub fn save(&self, repo: &str, date: NaiveDate, stats: &PrStats) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO pr_stats
             (repo_name, date, total_prs, avg_age_days, avg_age_days_excluding_oldest,
              avg_comments, avg_comments_with_comments, approved_prs, oldest_pr_age,
              oldest_pr_title, prs_with_zero_comments)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                repo,
                date.format(DATE_FORMAT).to_string(),
                stats.total_prs,
                stats.avg_age_days,
                stats.avg_age_days_excluding_oldest,
                stats.avg_comments,
                stats.avg_comments_with_comments,
                stats.approved_prs,
                stats.oldest_pr_age,
                stats.oldest_pr_title,
                stats.prs_with_zero_comments,
            ],
        )?;
        Ok(())
    }

    /// Loads the snapshot for `(repo, date)`, if one was recorded.
    pub fn load(&self, repo: &str, date: NaiveDate) -> Result<Option<PrStats>, StoreError> {
        let stats = self
            .conn
            .query_row(
                "SELECT total_prs, avg_age_days, avg_age_days_excluding_oldest,
                        avg_comments, avg_comments_with_comments, approved_prs,
                        oldest_pr_age, oldest_pr_title, prs_with_zero_comments
                 FROM pr_stats WHERE repo_name = ?1 AND date = ?2",
                params![repo, date.format(DATE_FORMAT).to_string()],
                stats_from_row,
            )
            .optional()?;
        Ok(stats)
    }

    /// Loads the most recent snapshot for a repository.
    pub fn latest(&self, repo: &str) -> Result<Option<(NaiveDate, PrStats)>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT date, total_prs, avg_age_days, avg_age_days_excluding_oldest,
                        avg_comments, avg_comments_with_comments, approved_prs,
                        oldest_pr_age, oldest_pr_title, prs_with_zero_comments
                 FROM pr_stats WHERE repo_name = ?1
                 ORDER BY date DESC LIMIT 1",
                params![repo],
                |row| {
                    let date: String = row.get(0)?;
                    let stats = stats_from_row_offset(row, 1)?;
                    Ok((date, stats))
                },
            )
            .optional()?;

        match row {
            Some((date, stats)) => Ok(Some((parse_date(&date)?, stats))),
            None => Ok(None),
        }
    }

    /// Loads all snapshots on or after `since`, optionally for one repo,
    /// ordered by repository and date.
    pub fn load_range(
        &self,
        repo: Option<&str>,
        since: NaiveDate,
    ) -> Result<Vec<SnapshotRow>, StoreError> {
        let since = since.format(DATE_FORMAT).to_string();
        let sql_base = "SELECT repo_name, date, total_prs, avg_age_days,
                        avg_age_days_excluding_oldest, avg_comments,
                        avg_comments_with_comments, approved_prs, oldest_pr_age,
                        oldest_pr_title, prs_with_zero_comments
                 FROM pr_stats WHERE date >= ?1";

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, PrStats)> {
            let repo_name: String = row.get(0)?;
            let date: String = row.get(1)?;
            let stats = stats_from_row_offset(row, 2)?;
            Ok((repo_name, date, stats))
        };

        let raw: Vec<(String, String, PrStats)> = match repo {
            Some(repo) => {
                let sql = format!("{sql_base} AND repo_name = ?2 ORDER BY repo_name, date");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![since, repo], map_row)?;
                rows.collect::<Result<_, _>>()?
            }
            None => {
                let sql = format!("{sql_base} ORDER BY repo_name, date");
                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt.query_map(params![since], map_row)?;
                rows.collect::<Result<_, _>>()?
            }
        };

        raw.into_iter()
            .map(|(repo_name, date, stats)| {
                Ok(SnapshotRow {
                    repo_name,
                    date: parse_date(&date)?,
                    stats,
                })
            })
            .collect()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDate(raw.to_string()))
}

fn stats_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrStats> {
    stats_from_row_offset(row, 0)
}

fn stats_from_row_offset(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<PrStats> {
    Ok(PrStats {
        total_prs: row.get(offset)?,
        avg_age_days: row.get(offset + 1)?,
        avg_age_days_excluding_oldest: row.get(offset + 2)?,
        avg_comments: row.get(offset + 3)?,
        avg_comments_with_comments: row.get(offset + 4)?,
        approved_prs: row.get(offset + 5)?,
        oldest_pr_age: row.get(offset + 6)?,
        oldest_pr_title: row.get(offset + 7)?,
        prs_with_zero_comments: row.get(offset + 8)?,
    })
}
