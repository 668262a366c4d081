use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://collegefootballplayoff.com/rankings.aspx";
pub const DEFAULT_LOG_FILE: &str = "cfp_scraper.log";
pub const USER_AGENT: &str = concat!("cfp-rankings-scraper/", env!("CARGO_PKG_VERSION"));

/// Label used by the site for the last ranking of a season.
pub const FINAL_WEEK: &str = "Final";
const REGULAR_SEASON_WEEKS: u32 = 15;

/// Which weeks to request for each season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekPlan {
    /// Request exactly these labels, in this order, for every season.
    Fixed(Vec<String>),
    /// Read the week dropdown from the index page and request what it offers.
    Discover,
}

impl Default for WeekPlan {
    fn default() -> Self {
        WeekPlan::Fixed(default_weeks())
    }
}

/// "Week 1" through "Week 15", then "Final".
pub fn default_weeks() -> Vec<String> {
    (1..=REGULAR_SEASON_WEEKS)
        .map(|n| format!("Week {}", n))
        .chain(std::iter::once(FINAL_WEEK.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    Browser,
}

impl Default for SourceKind {
    /// The browser when it is built in, since the site picks season and week
    /// through its dropdowns.
    fn default() -> Self {
        if cfg!(feature = "browser") {
            SourceKind::Browser
        } else {
            SourceKind::Http
        }
    }
}

/// Settings for the headless browser page source.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    /// How long to let the page update after navigating or changing a dropdown.
    pub settle: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            headless: true,
            chrome_path: None,
            settle: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub source: SourceKind,
    pub weeks: WeekPlan,
    /// Pause between two week requests.
    pub week_delay: Duration,
    /// Pause before the first request of a new season.
    pub year_delay: Duration,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub write_summary: bool,
    pub browser: BrowserSettings,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            source: SourceKind::default(),
            weeks: WeekPlan::default(),
            week_delay: Duration::from_secs(2),
            year_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
            output_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            write_summary: false,
            browser: BrowserSettings::default(),
        }
    }
}
