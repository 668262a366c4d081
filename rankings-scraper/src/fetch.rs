use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};

use crate::config::USER_AGENT;
use crate::error::FetchError;
use crate::parse::selected_options;

/// Anything that can hand back the HTML of a rankings page.
///
/// The aggregator only talks to this trait, so a plain HTTP fetch, a browser
/// session or canned fixtures can stand behind it.
pub trait PageSource {
    /// Rendered rankings page for one season and week label.
    fn fetch_rankings(&mut self, year: i32, week: &str) -> Result<String, FetchError>;

    /// The landing rankings page, used to read the year and week dropdowns.
    fn fetch_index(&mut self) -> Result<String, FetchError>;
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn fetch_rankings(&mut self, year: i32, week: &str) -> Result<String, FetchError> {
        (**self).fetch_rankings(year, week)
    }

    fn fetch_index(&mut self) -> Result<String, FetchError> {
        (**self).fetch_index()
    }
}

/// Fetches pages with a blocking HTTP client, passing year and week as query parameters.
pub struct HttpPageSource {
    client: Client,
    base_url: Url,
}

impl HttpPageSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(HttpPageSource { client, base_url })
    }

    pub fn rankings_url(&self, year: i32, week: &str) -> Url {
        rankings_url(&self.base_url, year, week)
    }

    fn get(&self, url: Url) -> Result<String, FetchError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(classify)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: response.url().to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        response.text().map_err(classify)
    }
}

impl PageSource for HttpPageSource {
    fn fetch_rankings(&mut self, year: i32, week: &str) -> Result<String, FetchError> {
        self.get(self.rankings_url(year, week))
    }

    fn fetch_index(&mut self) -> Result<String, FetchError> {
        self.get(self.base_url.clone())
    }
}

/// `base?year=<year>&week=<week>`, keeping any query the base already has.
pub fn rankings_url(base: &Url, year: i32, week: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("year", &year.to_string())
        .append_pair("week", week);
    url
}

/// Reject a page whose dropdowns show another season or week than the one requested.
///
/// Pages that mark no selected option can't be checked and pass.
pub fn verify_page(html: &str, year: i32, week: &str) -> Result<(), FetchError> {
    let selected = selected_options(html);
    let year_label = year.to_string();

    let checks = [
        ("year", year_label.as_str(), selected.year),
        ("week", week, selected.week),
    ];
    for (select, requested, shown) in checks {
        match shown {
            Some(shown) if shown != requested => {
                return Err(FetchError::WrongPage {
                    select,
                    requested: requested.to_string(),
                    shown,
                });
            }
            _ => {}
        }
    }

    Ok(())
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: err.url().map(Url::to_string).unwrap_or_default(),
        }
    } else {
        FetchError::Request(err)
    }
}
