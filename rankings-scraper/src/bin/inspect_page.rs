use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cfp_rankings_scraper::config::DEFAULT_BASE_URL;
use cfp_rankings_scraper::{
    open_source, outline_page, parse_rankings, PageSource, ScraperConfig, SourceKind,
};
use chrono::Utc;
use clap::Parser;

/// Fetch one rankings page, save it for regression testing and report what the parser sees
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    year: i32,

    /// Week label as shown on the site, e.g. "Week 12" or "Final"
    week: String,

    /// Name of the saved fixture (without .html)
    test_name: String,

    /// Drive a headless browser instead of plain HTTP
    #[arg(long)]
    browser: bool,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = "src/tests/fixtures/failures")]
    failures_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ScraperConfig {
        base_url: cli.base_url.clone(),
        source: if cli.browser {
            SourceKind::Browser
        } else {
            SourceKind::Http
        },
        ..ScraperConfig::default()
    };

    println!("Fetching {} {} from {}...", cli.year, cli.week, cli.base_url);

    let html = {
        let mut source = open_source(&config).context("Failed to open page source")?;
        source
            .fetch_rankings(cli.year, &cli.week)
            .context("Failed to fetch rankings page")?
    };

    fs::create_dir_all(&cli.failures_dir).context("Failed to create failures directory")?;
    let file_path = cli.failures_dir.join(format!("{}.html", cli.test_name));
    fs::write(&file_path, &html).context("Failed to write HTML file")?;
    println!(
        "Saved HTML to {} for regression testing",
        file_path.display()
    );

    let outline = outline_page(&html);
    println!("\nPage analysis:");
    println!("  - Title: {}", outline.title.as_deref().unwrap_or("(none)"));
    println!("  - Tables: {}", outline.tables);
    for (i, rows) in outline.table_rows.iter().enumerate() {
        println!("      Table {}: {} rows", i, rows);
    }
    println!("  - Select elements: {}", outline.selects.len());
    for (i, options) in outline.selects.iter().enumerate() {
        let preview: Vec<&str> = options.iter().take(5).map(String::as_str).collect();
        println!("      Select {}: {} options {:?}", i, options.len(), preview);
    }

    println!("\nAttempting to parse the rankings table:");
    match parse_rankings(&html, cli.year, &cli.week, Utc::now()) {
        Ok(rows) if rows.is_empty() => {
            println!("No ranking table found on this page.");
        }
        Ok(rows) => {
            println!("Parsed {} rankings:", rows.len());
            for row in rows.iter().take(10) {
                println!("  #{} {} ({})", row.rank, row.team, row.record);
            }
        }
        Err(e) => {
            println!("Parse failed with error: {}", e);
            println!("This page will be included in the regression tests.");
        }
    }

    Ok(())
}
