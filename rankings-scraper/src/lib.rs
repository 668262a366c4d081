pub mod aggregate;
#[cfg(feature = "browser")]
pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod parse;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::aggregate::{Aggregator, FailureKind, ScrapeReport, ScrapeSummary, WeekFailure};
#[cfg(feature = "browser")]
pub use crate::browser::BrowserPageSource;
pub use crate::config::{default_weeks, ScraperConfig, SourceKind, WeekPlan};
pub use crate::error::{ExportError, FetchError, InvalidRequest, ParseError, WeekError};
pub use crate::export::{export_all, export_by_year, export_combined, write_rows, ExportedFiles};
pub use crate::fetch::{HttpPageSource, PageSource};
pub use crate::model::{RankingRow, ScrapeRequest};
pub use crate::parse::{outline_page, parse_rankings, parse_select_options, PageOutline, SelectOptions};

/// Open the page source the configuration asks for.
pub fn open_source(config: &ScraperConfig) -> Result<Box<dyn PageSource>, FetchError> {
    match config.source {
        SourceKind::Http => Ok(Box::new(HttpPageSource::new(
            &config.base_url,
            config.timeout,
        )?)),
        #[cfg(feature = "browser")]
        SourceKind::Browser => Ok(Box::new(BrowserPageSource::launch(
            &config.base_url,
            &config.browser,
            config.timeout,
        )?)),
        #[cfg(not(feature = "browser"))]
        SourceKind::Browser => Err(FetchError::Browser(
            "built without the `browser` feature".to_string(),
        )),
    }
}
