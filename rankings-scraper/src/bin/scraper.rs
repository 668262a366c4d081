use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cfp_rankings_scraper::config::{BrowserSettings, DEFAULT_BASE_URL, DEFAULT_LOG_FILE};
use cfp_rankings_scraper::export::file_stamp;
use cfp_rankings_scraper::model::FIRST_SEASON;
use cfp_rankings_scraper::{
    export_all, logging, open_source, Aggregator, ScrapeRequest, ScraperConfig, SourceKind,
    WeekPlan,
};
use chrono::Local;
use clap::{Parser, ValueEnum};

/// Where ranking pages come from
#[derive(Debug, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lowercase")]
enum Source {
    /// Plain HTTP requests with year and week as query parameters
    Http,
    /// Headless Chromium driving the page's dropdowns (needs the `browser` feature)
    Browser,
}

/// Scrape College Football Playoff rankings into CSV files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First season to collect
    #[arg(long, default_value_t = FIRST_SEASON)]
    start_year: i32,

    /// Last season to collect [default: current year]
    #[arg(long)]
    end_year: Option<i32>,

    /// Directory for the CSV files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Append-only log file
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Page source [default: browser when built with the `browser` feature, else http]
    #[arg(long, value_enum)]
    source: Option<Source>,

    /// Rankings page URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Comma separated week labels to request [default: Week 1..Week 15, Final]
    #[arg(long, value_delimiter = ',', conflicts_with = "discover_weeks")]
    weeks: Vec<String>,

    /// Request the weeks listed in the page's week dropdown
    #[arg(long)]
    discover_weeks: bool,

    /// Pause between week requests, in milliseconds
    #[arg(long, default_value_t = 2000)]
    delay_ms: u64,

    /// Pause before starting a new season, in milliseconds
    #[arg(long, default_value_t = 5000)]
    year_delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Show the browser window instead of running headless
    #[arg(long)]
    show_browser: bool,

    /// Chrome/Chromium executable to launch
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Also write a JSON summary of the run
    #[arg(long)]
    summary: bool,

    /// Log every parsed row
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn request(&self) -> Result<ScrapeRequest> {
        let end_year = self
            .end_year
            .unwrap_or_else(|| ScrapeRequest::default().end_year());
        Ok(ScrapeRequest::new(self.start_year, end_year)?)
    }

    fn config(&self) -> ScraperConfig {
        let weeks = if self.discover_weeks {
            WeekPlan::Discover
        } else if self.weeks.is_empty() {
            WeekPlan::default()
        } else {
            WeekPlan::Fixed(
                self.weeks
                    .iter()
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect(),
            )
        };

        ScraperConfig {
            base_url: self.base_url.clone(),
            source: match self.source {
                Some(Source::Http) => SourceKind::Http,
                Some(Source::Browser) => SourceKind::Browser,
                None => SourceKind::default(),
            },
            weeks,
            week_delay: Duration::from_millis(self.delay_ms),
            year_delay: Duration::from_millis(self.year_delay_ms),
            timeout: Duration::from_secs(self.timeout_secs),
            output_dir: self.output_dir.clone(),
            log_file: self.log_file.clone(),
            write_summary: self.summary,
            browser: BrowserSettings {
                headless: !self.show_browser,
                chrome_path: self.chrome_path.clone(),
                ..BrowserSettings::default()
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    logging::init(&config.log_file, cli.verbose)?;
    let request = cli.request()?;

    println!("Starting CFP rankings scrape...");

    // The source (and any browser it holds) is released at the end of this block.
    let report = {
        let source = open_source(&config).context("Failed to open page source")?;
        let mut aggregator = Aggregator::from_config(source, &config);
        aggregator.run(&request)
    };

    if !report.failures.is_empty() {
        println!("{} weeks were skipped, see {}", report.failures.len(), config.log_file.display());
    }

    if report.rows.is_empty() {
        println!("No data collected. Check logs for errors.");
        return Ok(());
    }

    println!("\nSuccessfully collected {} rankings!", report.rows.len());

    let summary = report.summary();
    let stamp = file_stamp(&Local::now());
    let files = export_all(
        &config.output_dir,
        &report.rows,
        config.write_summary.then_some(&summary),
        &stamp,
    )
    .context("Failed to export rankings")?;

    println!("Main CSV: {}", files.combined.display());
    println!("Year files: {} created", files.by_year.len());
    if let Some(path) = &files.summary {
        println!("Summary: {}", path.display());
    }

    println!("\nSummary:");
    println!("Years: {:?}", summary.years);
    println!("Weeks per year: {:?}", summary.weeks_per_year);
    println!("Teams in rankings: {}", summary.teams);

    Ok(())
}
