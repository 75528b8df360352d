//! Skill mention counting and tag ranking.
//!
//! [`SkillCounter`] is a pure fold over normalized jobs; [`count_skills`]
//! drives it over the paginated search operation of the listings API.

use crate::api::{JobListings, ListingQuery};
use crate::config::SkillsConfig;
use crate::error::Result;
use crate::models::{NormalizedJob, SkillCount};
use crate::normalize::{DateRange, normalize_job};
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Whole-word, case-insensitive pattern for one vocabulary token.
///
/// Each edge uses `\b` when the token's edge character is a word character
/// and `\B` otherwise, so tokens such as `c++` or `c#` still require a
/// separator after them.
fn token_pattern(token: &str) -> Option<Regex> {
    let edge = |c: char| {
        if c.is_alphanumeric() || c == '_' { r"\b" } else { r"\B" }
    };
    let first = token.chars().next()?;
    let last = token.chars().last()?;
    let pattern = format!("(?i){}{}{}", edge(first), regex::escape(token), edge(last));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(token, error = %e, "Skipping skill token");
            None
        }
    }
}

/// Running counts for a closed vocabulary over an inclusive date range.
#[derive(Debug)]
pub struct SkillCounter {
    range: DateRange,
    skills: Vec<(String, Option<Regex>)>,
    counts: Vec<usize>,
    considered: usize,
    kept: usize,
}

impl SkillCounter {
    pub fn new(vocabulary: &[String], range: DateRange) -> Self {
        let skills: Vec<_> = vocabulary
            .iter()
            .map(|token| (token.clone(), token_pattern(token)))
            .collect();
        let counts = vec![0; skills.len()];
        Self {
            range,
            skills,
            counts,
            considered: 0,
            kept: 0,
        }
    }

    /// Count one job's mentions if it has a date inside the range.
    pub fn observe(&mut self, job: &NormalizedJob) {
        self.considered += 1;
        match job.publication_date {
            Some(date) if self.range.contains(date) => {}
            _ => return,
        }
        self.kept += 1;

        let text = [&job.title, &job.description, &job.company_name]
            .into_iter()
            .filter(|s| !s.is_empty())
            .join(" ");
        for ((_, pattern), count) in self.skills.iter().zip(self.counts.iter_mut()) {
            if let Some(re) = pattern {
                *count += re.find_iter(&text).count();
            }
        }
    }

    /// Jobs seen and jobs that fell inside the range.
    pub fn stats(&self) -> (usize, usize) {
        (self.considered, self.kept)
    }

    /// Vocabulary sorted by count, descending; ties keep declaration order.
    pub fn into_ranking(self) -> Vec<SkillCount> {
        self.skills
            .into_iter()
            .zip(self.counts)
            .map(|((skill, _), count)| SkillCount { skill, count })
            .sorted_by(|a, b| b.count.cmp(&a.count))
            .collect()
    }
}

/// Count skill mentions across every posting published within `range`.
///
/// Pages of `config.page_size` records are requested by offset until a page
/// comes back short or empty, or `config.max_pages` pages have been read.
///
/// # Arguments
///
/// * `listings` - Listings API used for the paged search
/// * `config` - Vocabulary, page size and page cap
/// * `range` - Inclusive publication window; undated postings are skipped
///
/// # Returns
///
/// One [`SkillCount`] per vocabulary token, by count descending with ties in
/// vocabulary order.
///
/// # Errors
///
/// Any listings API failure aborts the count.
#[instrument(level = "info", skip(listings, config))]
pub async fn count_skills<L: JobListings>(
    listings: &L,
    config: &SkillsConfig,
    range: DateRange,
) -> Result<Vec<SkillCount>> {
    let page_size = config.page_size.max(1);
    let mut counter = SkillCounter::new(&config.vocabulary, range);

    let mut page = 0;
    loop {
        if page >= config.max_pages {
            warn!(
                max_pages = config.max_pages,
                "Page cap reached; results may be truncated"
            );
            break;
        }
        let query = ListingQuery::limit(page_size).with_offset(page * page_size);
        let batch = listings.search(&query).await?;
        debug!(page, records = batch.len(), "Fetched page");
        for record in &batch {
            counter.observe(&normalize_job(record));
        }
        page += 1;
        if batch.len() < page_size {
            break;
        }
    }

    let (considered, kept) = counter.stats();
    info!(pages = page, considered, kept, "Counted skills");
    Ok(counter.into_ranking())
}

/// Top `limit` tags by frequency after lowercasing and whitespace folding.
///
/// Ties keep first-seen order.
pub fn rank_tags<I, S>(tags: I, limit: usize) -> Vec<SkillCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for tag in tags {
        let tag = collapse_whitespace(&tag.as_ref().to_lowercase());
        if tag.is_empty() {
            continue;
        }
        let count = counts.entry(tag.clone()).or_insert(0);
        if *count == 0 {
            order.push(tag);
        }
        *count += 1;
    }
    let rows = order.into_iter().map(|skill| {
        let count = counts[&skill];
        SkillCount { skill, count }
    });
    rows.sorted_by(|a, b| b.count.cmp(&a.count))
        .take(limit)
        .collect()
}
