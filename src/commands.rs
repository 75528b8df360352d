//! Command handlers.
//!
//! Each command is split into a fetch/compute step generic over the
//! collaborators ([`JobListings`], [`PageSource`]) and the output step in
//! [`run`]. Input is validated before any request is made, and the listings
//! client is only built for commands that use it, so a missing API key never
//! blocks `list skills`.

use crate::analysis::{classify_employment_mode, count_skills, rank_tags, tally_zones};
use crate::api::{ItJobsClient, JobListings, ListingQuery};
use crate::cli::{Command, GetTarget, ListView, StatisticsView};
use crate::config::Config;
use crate::error::Result;
use crate::models::{EmploymentMode, NormalizedJob, RawRecord, SkillCount, ZoneTypeCount};
use crate::normalize::{DateRange, extract_company_name, extract_locations_text, normalize_job};
use crate::outputs::csv_export::{
    export, write_jobs, write_key_values, write_skill_counts, write_zone_counts,
};
use crate::outputs::json::print_pretty;
use crate::scrapers::teamlyzer::{
    Teamlyzer, fetch_job_tags, resolve_company_page, scrape_company_profile,
};
use crate::scrapers::{HttpPageSource, PageSource};
use crate::utils::value_to_text;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Type id the listings API uses for part-time postings.
///
/// The API exposes no symbolic name for it; swap in a lookup table if the
/// type taxonomy ever becomes available.
pub const PART_TIME_TYPE_ID: &str = "2";

/// Tags reported by `list skills`.
pub const TOP_TAGS: usize = 10;

/// The `n` most recent postings.
#[instrument(level = "info", skip(listings))]
pub async fn top_jobs<L: JobListings>(listings: &L, n: usize) -> Result<Vec<RawRecord>> {
    listings.list(&ListingQuery::limit(n)).await
}

fn is_part_time(record: &RawRecord) -> bool {
    record
        .get("types")
        .and_then(Value::as_array)
        .is_some_and(|types| {
            types
                .iter()
                .filter_map(|t| t.get("id"))
                .any(|id| value_to_text(id) == PART_TIME_TYPE_ID)
        })
}

/// Part-time postings whose company and locations contain the given text.
///
/// Matching is case-insensitive substring containment; at most `n` postings
/// are returned, in API order.
#[instrument(level = "info", skip(listings))]
pub async fn search_part_time<L: JobListings>(
    listings: &L,
    fetch_limit: usize,
    locality: &str,
    company: &str,
    n: usize,
) -> Result<Vec<RawRecord>> {
    let candidates = listings
        .search(&ListingQuery::limit(fetch_limit).with_query(locality))
        .await?;
    let total = candidates.len();

    let locality = locality.to_lowercase();
    let company = company.to_lowercase();
    let matches: Vec<RawRecord> = candidates
        .into_iter()
        .filter(|job| is_part_time(job))
        .filter(|job| extract_company_name(job).to_lowercase().contains(&company))
        .filter(|job| extract_locations_text(job).to_lowercase().contains(&locality))
        .take(n)
        .collect();

    info!(total, matched = matches.len(), "Filtered search results");
    Ok(matches)
}

#[instrument(level = "info", skip(listings))]
pub async fn job_mode<L: JobListings>(listings: &L, id: u64) -> Result<EmploymentMode> {
    let record = listings.get(id).await?;
    Ok(classify_employment_mode(&record))
}

/// A posting with its company's review-site profile merged in.
///
/// Resolution or scraping failures leave the posting unenriched.
#[instrument(level = "info", skip(listings, pages, site))]
pub async fn enriched_job<L: JobListings, P: PageSource>(
    listings: &L,
    pages: &P,
    site: &Teamlyzer,
    id: u64,
) -> Result<RawRecord> {
    let mut job = listings.get(id).await?;

    let company = extract_company_name(&job);
    if company.is_empty() {
        debug!("Posting has no company name; skipping enrichment");
        return Ok(job);
    }
    match resolve_company_page(pages, site, &company).await {
        Some(url) => scrape_company_profile(pages, &url).await.merge_into(&mut job),
        None => warn!(%company, "Company not found on review site"),
    }
    Ok(job)
}

/// Every posting the list operation returns, page by page.
///
/// Stops on the first empty page, or after `max_pages`. A short page is not
/// taken as the end, since the API may serve fewer records than `page_size`.
#[instrument(level = "info", skip(listings))]
pub async fn all_jobs<L: JobListings>(
    listings: &L,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<RawRecord>> {
    let page_size = page_size.max(1);
    let mut jobs = Vec::new();
    for page in 1..=max_pages {
        let batch = listings
            .list(&ListingQuery::limit(page_size).with_page(page))
            .await?;
        if batch.is_empty() {
            info!(pages = page - 1, total = jobs.len(), "Fetched all postings");
            return Ok(jobs);
        }
        jobs.extend(batch);
    }
    warn!(max_pages, total = jobs.len(), "Page cap reached; statistics may be incomplete");
    Ok(jobs)
}

pub async fn zone_statistics<L: JobListings>(
    listings: &L,
    page_size: usize,
    max_pages: usize,
) -> Result<Vec<ZoneTypeCount>> {
    let jobs = all_jobs(listings, page_size, max_pages).await?;
    Ok(tally_zones(&jobs))
}

pub async fn tag_ranking<P: PageSource>(
    pages: &P,
    site: &Teamlyzer,
    position: &str,
) -> Result<Vec<SkillCount>> {
    let tags = fetch_job_tags(pages, site, position).await?;
    Ok(rank_tags(tags, TOP_TAGS))
}

fn export_jobs(path: &str, records: &[RawRecord]) -> Result<()> {
    let jobs: Vec<NormalizedJob> = records.iter().map(normalize_job).collect();
    export(path, |out| write_jobs(out, &jobs))?;
    eprintln!("CSV saved to: {path}");
    Ok(())
}

/// Execute one parsed command against the live services.
pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Top { n, export: csv } => {
            let listings = ItJobsClient::new(&config.listings)?;
            let jobs = top_jobs(&listings, n).await?;
            print_pretty(&jobs)?;
            if let Some(path) = csv.target(|| format!("top_{n}.csv")) {
                export_jobs(&path, &jobs)?;
            }
        }
        Command::Search {
            locality,
            company,
            n,
            export: csv,
        } => {
            let listings = ItJobsClient::new(&config.listings)?;
            let jobs =
                search_part_time(&listings, config.search.fetch_limit, &locality, &company, n)
                    .await?;
            print_pretty(&jobs)?;
            let default_name = || format!("search_{company}_{locality}.csv").replace(' ', "_");
            if let Some(path) = csv.target(default_name) {
                export_jobs(&path, &jobs)?;
            }
        }
        Command::Type { job_id } => {
            let listings = ItJobsClient::new(&config.listings)?;
            println!("{}", job_mode(&listings, job_id).await?);
        }
        Command::Skills { start, end } => {
            let range = DateRange::from_args(&start, &end)?;
            let listings = ItJobsClient::new(&config.listings)?;
            let ranking = count_skills(&listings, &config.skills, range).await?;
            print_pretty(&ranking)?;
        }
        Command::Get {
            target: GetTarget::JobId { id, csv },
        } => {
            let listings = ItJobsClient::new(&config.listings)?;
            let pages = HttpPageSource::new(&config.review_site)?;
            let site = Teamlyzer::new(&config.review_site);
            let job = enriched_job(&listings, &pages, &site, id).await?;
            print_pretty(&job)?;
            if csv {
                let path = format!("job_{id}.csv");
                export(&path, |out| write_key_values(out, &job))?;
                eprintln!("CSV saved to: {path}");
            }
        }
        Command::Statistics {
            view: StatisticsView::Zone { limit, out },
        } => {
            let listings = ItJobsClient::new(&config.listings)?;
            let rows = zone_statistics(&listings, limit, config.statistics.max_pages).await?;
            export(&out, |w| write_zone_counts(w, &rows))?;
            println!("{out}");
        }
        Command::List {
            view: ListView::Skills { position, csv, out },
        } => {
            let pages = HttpPageSource::new(&config.review_site)?;
            let site = Teamlyzer::new(&config.review_site);
            let ranking = tag_ranking(&pages, &site, &position).await?;
            print_pretty(&ranking)?;
            if csv {
                export(&out, |w| write_skill_counts(w, &ranking))?;
                eprintln!("CSV saved to: {out}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeListings;
    use crate::config::ReviewSiteConfig;
    use crate::error::AppError;
    use crate::scrapers::teamlyzer::tests::FakeSite;
    use serde_json::json;

    fn site() -> Teamlyzer {
        Teamlyzer::new(&ReviewSiteConfig::default())
    }

    #[tokio::test]
    async fn test_top_jobs_requests_limit() {
        let listings = FakeListings::new(vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
        let jobs = top_jobs(&listings, 2).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(listings.calls.borrow()[0], ("list", ListingQuery::limit(2)));
    }

    #[tokio::test]
    async fn test_search_part_time_filters() {
        let listings = FakeListings::new(vec![
            json!({"id": 1, "company": {"name": "Acme Portugal"}, "types": [{"id": 2}], "locations": [{"name": "Lisboa"}]}),
            json!({"id": 2, "company": {"name": "Acme"}, "types": [{"id": 1}], "locations": [{"name": "Lisboa"}]}),
            json!({"id": 3, "company": {"name": "Other"}, "types": [{"id": "2"}], "locations": [{"name": "Lisboa"}]}),
            json!({"id": 4, "company": "ACME", "types": [{"id": "2"}], "locations": [{"name": "Porto"}]}),
            json!({"id": 5, "company": "acme lda", "types": [{"id": 1}, {"id": "2"}], "locations": [{"name": "Grande Lisboa"}]}),
            json!({"id": 6, "company": "Acme", "types": [{"id": 2}], "locations": [{"name": "Lisboa"}]}),
        ]);
        let jobs = search_part_time(&listings, 100, "lisboa", "ACME", 2).await.unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(5)]);

        let (op, query) = &listings.calls.borrow()[0];
        assert_eq!(*op, "search");
        assert_eq!(query.q.as_deref(), Some("lisboa"));
        assert_eq!(query.limit, Some(100));
    }

    #[tokio::test]
    async fn test_job_mode() {
        let listings = FakeListings::new(vec![json!({"id": 9, "title": "Dev (Híbrido)"})]);
        assert_eq!(job_mode(&listings, 9).await.unwrap(), EmploymentMode::Hybrid);
    }

    #[tokio::test]
    async fn test_job_mode_upstream_failure_is_fatal() {
        let err = job_mode(&FakeListings::unavailable(), 9).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_enriched_job_merges_profile() {
        let listings = FakeListings::new(vec![json!({"id": 7, "title": "Dev", "company": {"name": "Acme"}})]);
        let pages = FakeSite::default()
            .with(
                "https://pt.teamlyzer.com/companies/ranking",
                r#"<a href="/companies/acme">Acme</a>"#,
            )
            .with(
                "https://pt.teamlyzer.com/companies/acme",
                r#"<span class="rating-value">4.5</span><p class="description">Anvils</p>"#,
            );
        let job = enriched_job(&listings, &pages, &site(), 7).await.unwrap();

        assert_eq!(job["title"], json!("Dev"));
        assert_eq!(job["teamlyzer_company_url"], json!("https://pt.teamlyzer.com/companies/acme"));
        assert_eq!(job["teamlyzer_rating"], json!("4.5"));
        assert_eq!(job["teamlyzer_description"], json!("Anvils"));
        assert_eq!(job["teamlyzer_benefits"], json!(""));
    }

    #[tokio::test]
    async fn test_enriched_job_without_match_is_unchanged() {
        let listings = FakeListings::new(vec![json!({"id": 7, "company": "Nowhere Inc"})]);
        let job = enriched_job(&listings, &FakeSite::default(), &site(), 7).await.unwrap();
        assert_eq!(job.len(), 2);
    }

    #[tokio::test]
    async fn test_enriched_job_without_company_skips_review_site() {
        let listings = FakeListings::new(vec![json!({"id": 7})]);
        let pages = FakeSite::default();
        enriched_job(&listings, &pages, &site(), 7).await.unwrap();
        assert!(pages.requested.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_all_jobs_pages_from_one() {
        let records = (0..5).map(|i| json!({"id": i})).collect();
        let listings = FakeListings::new(records);
        let jobs = all_jobs(&listings, 2, 100).await.unwrap();
        assert_eq!(jobs.len(), 5);
        let pages: Vec<_> = listings.calls.borrow().iter().map(|(_, q)| q.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    /// Serves at most `cap` records per page whatever limit is asked for.
    struct CappedListings {
        inner: FakeListings,
        cap: usize,
    }

    impl JobListings for CappedListings {
        async fn list(&self, query: &ListingQuery) -> Result<Vec<RawRecord>> {
            let capped = ListingQuery {
                limit: query.limit.map(|l| l.min(self.cap)),
                ..query.clone()
            };
            self.inner.list(&capped).await
        }

        async fn get(&self, id: u64) -> Result<RawRecord> {
            self.inner.get(id).await
        }

        async fn search(&self, query: &ListingQuery) -> Result<Vec<RawRecord>> {
            self.inner.search(query).await
        }
    }

    #[tokio::test]
    async fn test_all_jobs_keeps_going_past_server_capped_pages() {
        let records = (0..7).map(|i| json!({"id": i})).collect();
        let listings = CappedListings {
            inner: FakeListings::new(records),
            cap: 3,
        };
        let jobs = all_jobs(&listings, 100, 50).await.unwrap();
        assert_eq!(jobs.len(), 7);
        assert_eq!(listings.inner.calls.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_all_jobs_page_cap() {
        let records = (0..10).map(|i| json!({"id": i})).collect();
        let listings = FakeListings::new(records);
        let jobs = all_jobs(&listings, 3, 2).await.unwrap();
        assert_eq!(jobs.len(), 6);
    }

    #[tokio::test]
    async fn test_zone_statistics() {
        let listings = FakeListings::new(vec![
            json!({"locations": [{"name": "Lisboa"}, {"name": "Porto"}], "types": [{"name": "Full-time"}]}),
            json!({"locations": [{"name": "Lisboa"}], "types": [{"name": "Full-time"}]}),
        ]);
        let rows = zone_statistics(&listings, 100, 10).await.unwrap();
        assert_eq!(rows[0].zone, "Lisboa");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn test_tag_ranking_top_ten() {
        let html: String = (0..12)
            .flat_map(|i| std::iter::repeat_n(format!("<span class=\"tag\">Skill{i}</span>"), 12 - i))
            .collect();
        let pages = FakeSite::default().with(
            "https://pt.teamlyzer.com/companies/jobs?tags=rust&order=most_relevant",
            &html,
        );
        let ranking = tag_ranking(&pages, &site(), "rust").await.unwrap();
        assert_eq!(ranking.len(), TOP_TAGS);
        assert_eq!(ranking[0], SkillCount { skill: "skill0".into(), count: 12 });
        assert_eq!(ranking[9].skill, "skill9");
    }

    #[test]
    fn test_is_part_time() {
        let part_time = json!({"types": [{"id": 2}]});
        let full_time = json!({"types": [{"id": 1}]});
        let untyped = json!({"types": "2"});
        assert!(is_part_time(part_time.as_object().unwrap()));
        assert!(!is_part_time(full_time.as_object().unwrap()));
        assert!(!is_part_time(untyped.as_object().unwrap()));
    }
}
