use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain the page for one (year, week).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid base URL {0:?}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(String),

    /// The page came back for a different season or week than the one requested.
    #[error("page shows {select} {shown:?}, expected {requested:?}")]
    WrongPage {
        select: &'static str,
        requested: String,
        shown: String,
    },

    /// The page no longer offers the dropdown or option we need to select.
    #[error("no {select} option labelled {label:?}")]
    OptionMissing { select: &'static str, label: String },
}

/// The ranking table was found but its rows don't make sense.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("rank {rank} has no team name")]
    MissingTeam { rank: u8 },

    #[error("rank {rank} appears more than once")]
    DuplicateRank { rank: u8 },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write summary {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("start year {start_year} is after end year {end_year}")]
pub struct InvalidRequest {
    pub start_year: i32,
    pub end_year: i32,
}

/// Why one (year, week) produced no rows.
#[derive(Debug, Error)]
pub enum WeekError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
