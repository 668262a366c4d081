use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::model::RankingRow;

pub const MAX_RANK: u8 = 25;

/// First-cell texts that mark a header row rather than a ranked team.
const HEADER_LABELS: [&str; 4] = ["rank", "#", "ranking", "rnk"];

/// Team name is searched for in the cells right after the rank.
const TEAM_CELLS: usize = 4;
/// Record can sit a few columns further right (after previous rank, points...).
const RECORD_CELLS: usize = 6;
const MAX_RECORD_LEN: usize = 8;

/// Year and week choices offered by the page's two dropdowns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectOptions {
    pub years: Vec<i32>,
    pub weeks: Vec<String>,
}

/// Options the page marks `selected` in its year and week dropdowns.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectedOptions {
    pub year: Option<String>,
    pub week: Option<String>,
}

/// Rough shape of a page, for diagnosing parse failures.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageOutline {
    pub title: Option<String>,
    pub tables: usize,
    /// Row count of each table, in document order.
    pub table_rows: Vec<usize>,
    /// Visible option labels of each `<select>`, in document order.
    pub selects: Vec<Vec<String>>,
}

struct RankedEntry {
    rank: u8,
    team: String,
    record: String,
}

/// Extract the ranking table of one (year, week) page.
///
/// The ranking table is the first `<table>` holding at least one ranked row.
/// No such table means no rankings were published that week, which is an
/// empty result rather than an error.
pub fn parse_rankings(
    html: &str,
    year: i32,
    week: &str,
    scraped_at: DateTime<Utc>,
) -> Result<Vec<RankingRow>, ParseError> {
    let document = Html::parse_document(html);
    let table_selector = selector("table");
    let row_selector = selector("tr");

    for table in document.select(&table_selector) {
        let mut entries = Vec::new();
        for row in own_rows(table, &row_selector) {
            let cells = row_cells(row);
            if let Some(entry) = parse_row(&cells)? {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            continue;
        }

        entries.sort_by_key(|entry| entry.rank);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].rank == pair[1].rank) {
            return Err(ParseError::DuplicateRank { rank: pair[0].rank });
        }

        let rows = entries
            .into_iter()
            .map(|entry| RankingRow {
                year,
                week: week.to_string(),
                rank: entry.rank,
                team: entry.team,
                record: entry.record,
                scraped_at,
            })
            .collect();
        return Ok(rows);
    }

    Ok(Vec::new())
}

/// Read the year dropdown (first `<select>`) and week dropdown (second).
pub fn parse_select_options(html: &str) -> SelectOptions {
    let document = Html::parse_document(html);
    let select_selector = selector("select");
    let option_selector = selector("option");

    let selects: Vec<Vec<String>> = document
        .select(&select_selector)
        .take(2)
        .map(|select| {
            select
                .select(&option_selector)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<String>>()
        })
        .collect();

    let years: Vec<i32> = selects
        .first()
        .map(|labels| labels.iter().filter_map(|l| l.parse::<i32>().ok()).collect())
        .unwrap_or_default();
    let weeks = selects.get(1).cloned().unwrap_or_default();

    SelectOptions { years, weeks }
}

/// Which season and week the page says it is showing, where it says so.
pub fn selected_options(html: &str) -> SelectedOptions {
    let document = Html::parse_document(html);
    let select_selector = selector("select");
    let selected_selector = selector("option[selected]");

    let mut chosen = document.select(&select_selector).take(2).map(|select| {
        select
            .select(&selected_selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    });

    SelectedOptions {
        year: chosen.next().flatten(),
        week: chosen.next().flatten(),
    }
}

pub fn outline_page(html: &str) -> PageOutline {
    let document = Html::parse_document(html);
    let title_selector = selector("title");
    let table_selector = selector("table");
    let row_selector = selector("tr");
    let select_selector = selector("select");
    let option_selector = selector("option");

    let title = document
        .select(&title_selector)
        .next()
        .map(element_text)
        .filter(|title| !title.is_empty());

    let table_rows: Vec<usize> = document
        .select(&table_selector)
        .map(|table| own_rows(table, &row_selector).count())
        .collect();

    let selects = document
        .select(&select_selector)
        .map(|select| {
            select
                .select(&option_selector)
                .map(element_text)
                .collect::<Vec<String>>()
        })
        .collect();

    PageOutline {
        title,
        tables: table_rows.len(),
        table_rows,
        selects,
    }
}

fn parse_row(cells: &[String]) -> Result<Option<RankedEntry>, ParseError> {
    if cells.len() < 3 {
        return Ok(None);
    }

    let rank_text = cells[0].to_lowercase();
    if HEADER_LABELS.contains(&rank_text.as_str()) {
        return Ok(None);
    }

    let rank = match parse_rank(&rank_text) {
        Some(rank) => rank,
        None => return Ok(None),
    };

    let record = cells[1..cells.len().min(RECORD_CELLS)]
        .iter()
        .find_map(|cell| as_record(cell))
        .unwrap_or_default();

    let team = cells[1..cells.len().min(TEAM_CELLS)]
        .iter()
        .map(|cell| strip_logo(cell))
        .find(|text| looks_like_team(text))
        .ok_or(ParseError::MissingTeam { rank })?;

    Ok(Some(RankedEntry { rank, team, record }))
}

/// "#3", "3." and "3" all read as rank 3; anything outside 1..=25 is not a rank.
fn parse_rank(text: &str) -> Option<u8> {
    let cleaned = text.replace(&['#', '.'][..], "");
    cleaned
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|rank| (1..=MAX_RANK).contains(rank))
}

/// A win-loss (or win-loss-tie) record such as "12-1", with any spacing removed.
fn as_record(text: &str) -> Option<String> {
    let compact: String = text.split_whitespace().collect();
    if compact.len() > MAX_RECORD_LEN {
        return None;
    }

    let parts: Vec<&str> = compact.split('-').collect();
    let valid = (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Some(compact)
    } else {
        None
    }
}

fn looks_like_team(text: &str) -> bool {
    text.chars().count() > 2
        && !text.chars().all(|c| c.is_ascii_digit())
        && as_record(text).is_none()
}

/// Team cells often carry the logo's label next to the name.
fn strip_logo(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("logo"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rows of `table` itself, leaving out rows of tables nested inside it.
fn own_rows<'a>(
    table: ElementRef<'a>,
    row_selector: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    table.select(row_selector).filter(move |row| {
        row.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|ancestor| ancestor.value().name() == "table")
            .map_or(false, |owner| owner.id() == table.id())
    })
}

/// Direct `td`/`th` children of a row, as text.
fn row_cells(row: ElementRef) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(element_text)
        .collect()
}

/// Text nodes of an element, trimmed and joined by single spaces.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}
