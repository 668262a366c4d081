//! Headless Chromium page source using chromiumoxide.
//!
//! The rankings page picks its season and week through two `<select>`
//! dropdowns, so this source loads the page, chooses the options the way a
//! visitor would and returns the rendered HTML.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::config::BrowserSettings;
use crate::error::FetchError;
use crate::fetch::PageSource;

const YEAR_SELECT: usize = 0;
const WEEK_SELECT: usize = 1;

/// One browser session, held for the whole run and closed on drop.
pub struct BrowserPageSource {
    runtime: Runtime,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Page,
    base_url: String,
    settle: Duration,
    timeout: Duration,
}

impl BrowserPageSource {
    pub fn launch(
        base_url: &str,
        settings: &BrowserSettings,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        log::info!("Setting up Chromium...");

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Browser(format!("failed to start runtime: {e}")))?;

        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .window_size(1920, 1080)
            .request_timeout(timeout);
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(config))
            .map_err(|e| FetchError::Browser(format!("failed to launch Chromium: {e}")))?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| FetchError::Browser(format!("failed to open page: {e}")))?;

        log::info!("Chromium initialized successfully");
        Ok(BrowserPageSource {
            runtime,
            browser: Some(browser),
            handler: Some(handler),
            page,
            base_url: base_url.to_string(),
            settle: settings.settle,
            timeout,
        })
    }

    /// Shut the browser down. Also runs on drop.
    pub fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            let closed = self.runtime.block_on(async {
                browser.close().await?;
                browser.wait().await?;
                Ok::<_, Box<dyn std::error::Error>>(())
            });
            if let Err(e) = closed {
                log::warn!("Failed to close Chromium cleanly: {}", e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }

    fn load(&self, year: Option<i32>, week: Option<&str>) -> Result<String, FetchError> {
        let url = self.base_url.clone();
        let work = async {
            self.page
                .goto(url.as_str())
                .await
                .map_err(|e| FetchError::Browser(format!("navigation to {url} failed: {e}")))?;
            tokio::time::sleep(self.settle).await;

            if let Some(year) = year {
                self.select_option(YEAR_SELECT, "year", &year.to_string())
                    .await?;
            }
            if let Some(week) = week {
                self.select_option(WEEK_SELECT, "week", week).await?;
            }

            self.page
                .content()
                .await
                .map_err(|e| FetchError::Browser(format!("failed to read page content: {e}")))
        };

        self.runtime
            .block_on(async { tokio::time::timeout(self.timeout * 3, work).await })
            .map_err(|_| FetchError::Timeout { url: self.base_url.clone() })?
    }

    /// Choose an option by its visible text and fire `change`, then let the page update.
    ///
    /// The `selected` attribute is moved too, so the returned HTML records the choice.
    async fn select_option(
        &self,
        index: usize,
        name: &'static str,
        label: &str,
    ) -> Result<(), FetchError> {
        let script = select_script(index, label);
        let selected: bool = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| FetchError::Browser(format!("failed to select {name}: {e}")))?
            .into_value()
            .map_err(|e| FetchError::Browser(format!("unexpected {name} selection result: {e}")))?;

        if !selected {
            return Err(FetchError::OptionMissing {
                select: name,
                label: label.to_string(),
            });
        }

        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}

impl PageSource for BrowserPageSource {
    fn fetch_rankings(&mut self, year: i32, week: &str) -> Result<String, FetchError> {
        self.load(Some(year), Some(week))
    }

    fn fetch_index(&mut self) -> Result<String, FetchError> {
        self.load(None, None)
    }
}

impl Drop for BrowserPageSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Script selecting the option of the `index`th `<select>` whose text is `label`.
///
/// Evaluates to `false` when the dropdown or option is missing.
fn select_script(index: usize, label: &str) -> String {
    // A JSON string is a valid JS string literal.
    let label = serde_json::Value::String(label.to_string()).to_string();
    format!(
        r#"(() => {{
    const select = document.querySelectorAll("select")[{index}];
    if (!select) return false;
    const option = Array.from(select.options).find(o => o.text.trim() === {label});
    if (!option) return false;
    Array.from(select.options).forEach(o => o.removeAttribute("selected"));
    option.setAttribute("selected", "selected");
    select.value = option.value;
    select.dispatchEvent(new Event("change", {{ bubbles: true }}));
    return true;
}})()"#
    )
}
