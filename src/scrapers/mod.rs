//! HTML fetching and querying for the company-review website.
//!
//! # Layout
//!
//! - [`PageSource`]: "fetch this URL, give me the HTML or nothing"
//! - [`HttpPageSource`]: the `reqwest` implementation
//! - [`Page`]: an opaque parsed document that only answers CSS-selector text
//!   queries, so markup drift stays contained here and in the selector lists
//! - [`teamlyzer`]: employer resolution, profile scraping and job-tag ranking
//!
//! Review-site pages are a secondary source: a failed fetch is logged and
//! reported as `None`, never as an error.

pub mod teamlyzer;

use crate::config::ReviewSiteConfig;
use crate::error::{AppError, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, instrument, warn};

/// Something that can fetch HTML pages.
pub trait PageSource {
    /// The body of a successful (2xx) response, or `None` on any failure.
    async fn fetch_page(&self, url: &str) -> Option<String>;
}

/// [`PageSource`] over HTTP with a fixed timeout and user agent.
pub struct HttpPageSource {
    client: Client,
}

impl fmt::Debug for HttpPageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPageSource").finish_non_exhaustive()
    }
}

impl HttpPageSource {
    pub fn new(config: &ReviewSiteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|source| AppError::Upstream {
                url: config.root_url.clone(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Page fetch failed");
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Page not available");
            return None;
        }
        match response.text().await {
            Ok(body) => {
                debug!(bytes = body.len(), "Fetched page");
                Some(body)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read page body");
                None
            }
        }
    }
}

/// An anchor's target and rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// A parsed HTML document.
pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Rendered text of the first element matching `selector`, if non-empty.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let selector = parse_selector(selector)?;
        let element = self.document.select(&selector).next()?;
        let text = rendered_text(element);
        (!text.is_empty()).then_some(text)
    }

    /// Try `selectors` in order and keep the first non-empty text; `""` if none.
    pub fn pick_first_text(&self, selectors: &[&str]) -> String {
        crate::utils::first_hit(selectors.iter().copied(), |s| self.first_text(s))
            .unwrap_or_default()
    }

    /// Non-empty rendered texts of every element matching `selector`, in document order.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .map(rendered_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Every `a[href]` in the document.
    pub fn links(&self) -> Vec<Link> {
        let Some(selector) = parse_selector("a[href]") else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                Some(Link {
                    href: href.to_string(),
                    text: rendered_text(a),
                })
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector, error = %e, "Invalid CSS selector");
            None
        }
    }
}

/// Text nodes trimmed, empties dropped, joined by single spaces.
fn rendered_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
