use std::fs;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};

use crate::model::RankingRow;

pub mod fixtures;
pub mod parse_tests;

/// Fixed collection time so exported files are reproducible.
pub fn scraped_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 12, 20, 18, 30, 0).unwrap()
}

pub fn row(year: i32, week: &str, rank: u8, team: &str, record: &str) -> RankingRow {
    RankingRow {
        year,
        week: week.to_string(),
        rank,
        team: team.to_string(),
        record: record.to_string(),
        scraped_at: scraped_at(),
    }
}

/// Save a page the parser choked on so the regression sweep keeps checking it.
pub fn save_failed_html(html: &str, test_name: &str) -> Result<()> {
    let failures_dir = fixtures::failures_dir();
    fs::create_dir_all(&failures_dir)?;

    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, html)?;

    println!("Saved failed HTML to {}", file_path.display());
    Ok(())
}
