use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::aggregate::ScrapeSummary;
use crate::error::ExportError;
use crate::model::RankingRow;

pub const HEADER: [&str; 6] = ["year", "week", "rank", "team", "record", "scraped_at"];
const FILE_PREFIX: &str = "cfp_rankings";

/// Files written by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub combined: PathBuf,
    pub by_year: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// `YYYYmmdd_HHMMSS`, used to name the combined file of a run.
pub fn file_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d_%H%M%S").to_string()
}

pub fn combined_file_name(stamp: &str) -> String {
    format!("{}_{}.csv", FILE_PREFIX, stamp)
}

pub fn year_file_name(year: i32) -> String {
    format!("{}_{}.csv", FILE_PREFIX, year)
}

pub fn summary_file_name(stamp: &str) -> String {
    format!("{}_{}_summary.json", FILE_PREFIX, stamp)
}

/// Write the header and `rows`, in order, as CSV.
pub fn write_rows<W: Write>(writer: W, rows: &[RankingRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, rows: &[RankingRow]) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    write_rows(BufWriter::new(file), rows).map_err(|source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// All rows in one file named after the run's stamp.
pub fn export_combined(dir: &Path, rows: &[RankingRow], stamp: &str) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;
    let path = dir.join(combined_file_name(stamp));
    export_csv(&path, rows)?;

    log::info!("Data exported to {}", path.display());
    Ok(path)
}

/// One file per year present in `rows`, each keeping the collection order.
pub fn export_by_year(dir: &Path, rows: &[RankingRow]) -> Result<Vec<PathBuf>, ExportError> {
    let mut years: BTreeMap<i32, Vec<RankingRow>> = BTreeMap::new();
    for row in rows {
        years.entry(row.year).or_default().push(row.clone());
    }

    if years.is_empty() {
        return Ok(Vec::new());
    }
    ensure_dir(dir)?;

    let mut files_created = Vec::with_capacity(years.len());
    for (year, year_rows) in &years {
        let path = dir.join(year_file_name(*year));
        export_csv(&path, year_rows)?;

        log::info!("Created {}: {} rankings", path.display(), year_rows.len());
        files_created.push(path);
    }

    Ok(files_created)
}

pub fn export_summary(dir: &Path, summary: &ScrapeSummary, stamp: &str) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;
    let path = dir.join(summary_file_name(stamp));

    let json = serde_json::to_string_pretty(summary).map_err(|source| ExportError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!("Summary written to {}", path.display());
    Ok(path)
}

/// Combined file, per-year files and, if given, the run summary.
pub fn export_all(
    dir: &Path,
    rows: &[RankingRow],
    summary: Option<&ScrapeSummary>,
    stamp: &str,
) -> Result<ExportedFiles, ExportError> {
    let combined = export_combined(dir, rows, stamp)?;
    let by_year = export_by_year(dir, rows)?;
    let summary = summary
        .map(|summary| export_summary(dir, summary, stamp))
        .transpose()?;

    Ok(ExportedFiles {
        combined,
        by_year,
        summary,
    })
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
