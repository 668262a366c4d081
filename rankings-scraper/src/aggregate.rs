use std::collections::{BTreeMap, BTreeSet};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{default_weeks, ScraperConfig, WeekPlan};
use crate::error::WeekError;
use crate::fetch::{verify_page, PageSource};
use crate::model::{RankingRow, ScrapeRequest};
use crate::parse::{parse_rankings, parse_select_options};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Fetch,
    Parse,
}

/// A (year, week) that was skipped.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WeekFailure {
    pub year: i32,
    pub week: String,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Ordered by year, then week plan order, then rank.
    pub rows: Vec<RankingRow>,
    pub failures: Vec<WeekFailure>,
    pub pages_attempted: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub total_rows: usize,
    pub years: Vec<i32>,
    pub weeks_per_year: BTreeMap<i32, usize>,
    pub teams: usize,
    pub pages_attempted: usize,
    pub failures: Vec<WeekFailure>,
}

impl ScrapeReport {
    pub fn summary(&self) -> ScrapeSummary {
        let mut weeks: BTreeMap<i32, BTreeSet<&str>> = BTreeMap::new();
        let mut teams = BTreeSet::new();

        for row in &self.rows {
            weeks.entry(row.year).or_default().insert(row.week.as_str());
            teams.insert(row.team.as_str());
        }

        ScrapeSummary {
            total_rows: self.rows.len(),
            years: weeks.keys().copied().collect(),
            weeks_per_year: weeks.iter().map(|(year, w)| (*year, w.len())).collect(),
            teams: teams.len(),
            pages_attempted: self.pages_attempted,
            failures: self.failures.clone(),
        }
    }
}

pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Drives a page source over every (year, week) of a request.
pub struct Aggregator<S> {
    source: S,
    weeks: WeekPlan,
    week_delay: Duration,
    year_delay: Duration,
    clock: Clock,
    requested: bool,
}

impl<S: PageSource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self::from_config(source, &ScraperConfig::default())
    }

    pub fn from_config(source: S, config: &ScraperConfig) -> Self {
        Aggregator {
            source,
            weeks: config.weeks.clone(),
            week_delay: config.week_delay,
            year_delay: config.year_delay,
            clock: Box::new(Utc::now),
            requested: false,
        }
    }

    pub fn with_weeks(mut self, weeks: WeekPlan) -> Self {
        self.weeks = weeks;
        self
    }

    pub fn with_delays(mut self, week_delay: Duration, year_delay: Duration) -> Self {
        self.week_delay = week_delay;
        self.year_delay = year_delay;
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Scrape every planned week of every requested year.
    ///
    /// Failed weeks are logged and recorded in the report; they never stop the run.
    pub fn run(&mut self, request: &ScrapeRequest) -> ScrapeReport {
        log::info!(
            "Starting scrape from {} to {}",
            request.start_year(),
            request.end_year()
        );

        let (years, weeks) = self.plan(request);
        log::info!("Will scrape years: {:?}", years);

        let mut report = ScrapeReport::default();

        for (year_index, &year) in years.iter().enumerate() {
            log::info!("Scraping year {}...", year);
            let rows_before = report.rows.len();

            for (week_index, week) in weeks.iter().enumerate() {
                let delay = if week_index == 0 && year_index > 0 {
                    self.year_delay
                } else {
                    self.week_delay
                };
                self.pace(delay);
                report.pages_attempted += 1;

                match self.scrape_week(year, week) {
                    Ok(rows) if rows.is_empty() => {
                        log::info!("Year {}, {}: no rankings", year, week);
                    }
                    Ok(rows) => {
                        log::info!("Year {}, {}: {} rankings", year, week, rows.len());
                        report.rows.extend(rows);
                    }
                    Err(err) => {
                        log::warn!("Skipping {}, {}: {}", year, week, err);
                        report.failures.push(WeekFailure {
                            year,
                            week: week.clone(),
                            kind: match &err {
                                WeekError::Fetch(_) => FailureKind::Fetch,
                                WeekError::Parse(_) => FailureKind::Parse,
                            },
                            message: err.to_string(),
                        });
                    }
                }
            }

            log::info!(
                "Year {} complete: {} rankings",
                year,
                report.rows.len() - rows_before
            );
        }

        log::info!(
            "Scraping completed. Total: {} rankings, {} weeks skipped",
            report.rows.len(),
            report.failures.len()
        );
        report
    }

    fn scrape_week(&mut self, year: i32, week: &str) -> Result<Vec<RankingRow>, WeekError> {
        log::debug!("Extracting rankings for {}, {}...", year, week);
        let html = self.source.fetch_rankings(year, week)?;
        verify_page(&html, year, week)?;
        let rows = parse_rankings(&html, year, week, (self.clock)())?;

        for row in &rows {
            log::debug!("Added: #{} {} ({})", row.rank, row.team, row.record);
        }
        Ok(rows)
    }

    /// Years and week labels to request, reading the page's dropdowns when discovering.
    fn plan(&mut self, request: &ScrapeRequest) -> (Vec<i32>, Vec<String>) {
        let requested: Vec<i32> = request.years().collect();

        let discovered = match self.weeks.clone() {
            WeekPlan::Fixed(weeks) => return (requested, weeks),
            WeekPlan::Discover => self.discover(),
        };

        match discovered {
            Some((available_years, weeks)) => {
                let years = if available_years.is_empty() {
                    log::warn!("Index page lists no years, trying the whole range");
                    requested
                } else {
                    requested
                        .into_iter()
                        .filter(|year| available_years.contains(year))
                        .collect()
                };
                (years, weeks)
            }
            None => (requested, default_weeks()),
        }
    }

    /// `None` when the index can't be used and the default weeks apply.
    fn discover(&mut self) -> Option<(Vec<i32>, Vec<String>)> {
        self.pace(self.week_delay);

        let html = match self.source.fetch_index() {
            Ok(html) => html,
            Err(err) => {
                log::warn!("Could not load index page, using default weeks: {}", err);
                return None;
            }
        };

        let options = parse_select_options(&html);
        log::info!("Found years: {:?}", options.years);
        log::info!("Found weeks: {:?}", options.weeks);

        if options.weeks.is_empty() {
            log::warn!("Index page lists no weeks, using default weeks");
            return None;
        }
        Some((options.years, options.weeks))
    }

    fn pace(&mut self, delay: Duration) {
        if self.requested && !delay.is_zero() {
            thread::sleep(delay);
        }
        self.requested = true;
    }
}
