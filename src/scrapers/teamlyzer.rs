//! Teamlyzer company pages.
//!
//! Three jobs:
//!
//! 1. [`resolve_company_page`]: find a company's page from a free-form name,
//!    first by fuzzy-matching the ranking index, then by guessing a slug.
//! 2. [`scrape_company_profile`]: read rating, description, benefits and
//!    average salary off a resolved page.
//! 3. [`fetch_job_tags`]: collect the tags shown on the job search for a position.
//!
//! Listing names rarely match Teamlyzer's canonical slugs (spacing,
//! punctuation, legal suffixes), which is why the ranking match comes first.

use super::{Page, PageSource};
use crate::config::ReviewSiteConfig;
use crate::error::{AppError, Result};
use crate::models::CompanyProfile;
use crate::utils::{normalize_text, slugify_company_name};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Path fragment shared by every company page.
const COMPANY_PATH: &str = "/companies/";

const RATING_SELECTORS: [&str; 3] = [".rating-value", ".rating .value", ".rating"];
const DESCRIPTION_SELECTORS: [&str; 3] =
    [".company-description", ".description", ".company__description"];
const SALARY_SELECTORS: [&str; 3] = [".salary-average", ".salary", ".average-salary"];
const BENEFIT_SELECTOR: &str = ".benefit, .benefits li, .tag";
const JOB_TAG_SELECTOR: &str = ".tag, a.tag, span.tag";

/// Benefits kept per company.
pub const MAX_BENEFITS: usize = 30;

/// URLs of the review site, derived from its root.
#[derive(Debug, Clone)]
pub struct Teamlyzer {
    root: String,
}

impl Teamlyzer {
    pub fn new(config: &ReviewSiteConfig) -> Self {
        Self {
            root: config.root_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn ranking_url(&self) -> String {
        format!("{}/companies/ranking", self.root)
    }

    pub fn company_url(&self, slug: &str) -> String {
        format!("{}{}{}", self.root, COMPANY_PATH, slug)
    }

    pub fn job_tags_url(&self, position: &str) -> String {
        format!(
            "{}/companies/jobs?tags={}&order=most_relevant",
            self.root,
            urlencoding::encode(position.trim())
        )
    }

    /// Absolute form of an href found on the site.
    fn absolute(&self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        let base = Url::parse(&format!("{}/", self.root)).ok()?;
        base.join(href).ok().map(|u| u.to_string())
    }
}

/// Find the Teamlyzer page for `company_name`.
///
/// # Arguments
///
/// * `source` - Where pages are fetched from
/// * `site` - URL builder for the review site
/// * `company_name` - Free-form employer name as found in a posting
///
/// # Returns
///
/// The absolute company page URL, or `None` when neither the ranking index
/// nor the slug guess produce a page; callers carry on without enrichment.
#[instrument(level = "info", skip(source, site))]
pub async fn resolve_company_page<S: PageSource>(
    source: &S,
    site: &Teamlyzer,
    company_name: &str,
) -> Option<String> {
    if let Some(url) = find_in_ranking(source, site, company_name).await {
        info!(%url, "Resolved company from ranking");
        return Some(url);
    }

    let slug = slugify_company_name(company_name);
    if slug.is_empty() {
        debug!("Company name yields no slug");
        return None;
    }
    let candidate = site.company_url(&slug);
    if source.fetch_page(&candidate).await.is_some() {
        info!(url = %candidate, "Resolved company from slug");
        return Some(candidate);
    }

    warn!("No Teamlyzer page found for company");
    None
}

async fn find_in_ranking<S: PageSource>(
    source: &S,
    site: &Teamlyzer,
    company_name: &str,
) -> Option<String> {
    let html = source.fetch_page(&site.ranking_url()).await?;
    match_ranking_anchor(&Page::parse(&html), site, company_name)
}

/// First company anchor whose folded text contains the folded name.
fn match_ranking_anchor(page: &Page, site: &Teamlyzer, company_name: &str) -> Option<String> {
    let target = normalize_text(company_name);
    if target.is_empty() {
        return None;
    }
    page.links()
        .into_iter()
        .filter(|link| link.href.contains(COMPANY_PATH) && !link.text.is_empty())
        .find(|link| normalize_text(&link.text).contains(&target))
        .and_then(|link| site.absolute(&link.href))
}

/// Scrape a company's attributes.
///
/// # Arguments
///
/// * `source` - Where pages are fetched from
/// * `page_url` - A company page, as returned by [`resolve_company_page`]
///
/// # Returns
///
/// Rating, description and average salary from the company page, and up to
/// [`MAX_BENEFITS`] benefits from its `benefits-and-values` sub-page. An
/// empty profile if the company page is unreachable.
#[instrument(level = "info", skip(source))]
pub async fn scrape_company_profile<S: PageSource>(source: &S, page_url: &str) -> CompanyProfile {
    let Some(html) = source.fetch_page(page_url).await else {
        warn!("Company page unavailable; skipping enrichment");
        return CompanyProfile::default();
    };

    let (rating, description, average_salary) = {
        let page = Page::parse(&html);
        (
            page.pick_first_text(&RATING_SELECTORS),
            page.pick_first_text(&DESCRIPTION_SELECTORS),
            page.pick_first_text(&SALARY_SELECTORS),
        )
    };

    let benefits_url = format!("{}/benefits-and-values", page_url.trim_end_matches('/'));
    let benefits = match source.fetch_page(&benefits_url).await {
        Some(html) => Page::parse(&html)
            .texts(BENEFIT_SELECTOR)
            .into_iter()
            .take(MAX_BENEFITS)
            .collect::<Vec<_>>()
            .join(", "),
        None => {
            debug!(url = %benefits_url, "Benefits page unavailable");
            String::new()
        }
    };

    CompanyProfile {
        source_url: page_url.to_string(),
        rating,
        description,
        benefits,
        average_salary,
    }
}

/// Tag texts shown on the job search for `position`.
///
/// # Errors
///
/// [`AppError::PageUnavailable`] when the search page cannot be fetched; the
/// page is the only data source of the calling command.
#[instrument(level = "info", skip(source, site))]
pub async fn fetch_job_tags<S: PageSource>(
    source: &S,
    site: &Teamlyzer,
    position: &str,
) -> Result<Vec<String>> {
    let url = site.job_tags_url(position);
    let html = source
        .fetch_page(&url)
        .await
        .ok_or_else(|| AppError::PageUnavailable(url.clone()))?;
    let tags = Page::parse(&html).texts(JOB_TAG_SELECTOR);
    info!(count = tags.len(), "Collected job tags");
    Ok(tags)
}
