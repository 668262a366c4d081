use chrono::{DateTime, Datelike, Local, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::InvalidRequest;

/// First season the CFP committee published rankings.
pub const FIRST_SEASON: i32 = 2014;

/// One team's position in one week's rankings.
///
/// Field order is the CSV column order.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct RankingRow {
    pub year: i32,
    pub week: String,
    pub rank: u8,
    pub team: String,
    pub record: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub scraped_at: DateTime<Utc>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Inclusive range of seasons to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeRequest {
    start_year: i32,
    end_year: i32,
}

impl ScrapeRequest {
    pub fn new(start_year: i32, end_year: i32) -> Result<Self, InvalidRequest> {
        if start_year > end_year {
            return Err(InvalidRequest {
                start_year,
                end_year,
            });
        }
        Ok(ScrapeRequest {
            start_year,
            end_year,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }
}

impl Default for ScrapeRequest {
    /// 2014 through the current season.
    fn default() -> Self {
        let current = Local::now().year().max(FIRST_SEASON);
        ScrapeRequest {
            start_year: FIRST_SEASON,
            end_year: current,
        }
    }
}
