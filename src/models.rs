//! Data models for job postings and their derived views.
//!
//! - [`RawRecord`]: the untyped payload returned by the listings API
//! - [`NormalizedJob`]: the schema-consistent view extracted from one record
//! - [`CompanyProfile`]: attributes scraped from a company's review page
//! - [`SkillCount`], [`ZoneTypeCount`]: aggregate rows
//! - [`EmploymentMode`]: single-record classification

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A job posting exactly as the listings API returned it.
///
/// No field is guaranteed to exist or to have a particular type.
pub type RawRecord = Map<String, Value>;

/// The extracted, schema-consistent view of a [`RawRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedJob {
    /// The source record's `id`, when it had one.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub publication_date: Option<chrono::NaiveDateTime>,
    pub salary_text: String,
    pub location_names: Vec<String>,
}

/// Company attributes scraped from the review site.
///
/// An all-empty profile means the page could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(rename = "teamlyzer_company_url")]
    pub source_url: String,
    #[serde(rename = "teamlyzer_rating")]
    pub rating: String,
    #[serde(rename = "teamlyzer_description")]
    pub description: String,
    /// Comma-joined, at most 30 items.
    #[serde(rename = "teamlyzer_benefits")]
    pub benefits: String,
    #[serde(rename = "teamlyzer_salary")]
    pub average_salary: String,
}

impl CompanyProfile {
    pub fn is_empty(&self) -> bool {
        self.source_url.is_empty()
            && self.rating.is_empty()
            && self.description.is_empty()
            && self.benefits.is_empty()
            && self.average_salary.is_empty()
    }

    /// Add the profile's fields to a record, overwriting keys of the same name.
    ///
    /// Empty profiles leave the record untouched.
    pub fn merge_into(&self, record: &mut RawRecord) {
        if self.is_empty() {
            return;
        }
        if let Ok(Value::Object(fields)) = serde_json::to_value(self) {
            record.extend(fields);
        }
    }
}

/// One row of a skill or tag ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// One row of the zone × job-type tally.
///
/// Serialized with the column names of the statistics CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTypeCount {
    #[serde(rename = "Zona")]
    pub zone: String,
    #[serde(rename = "Tipo de Trabalho")]
    pub job_type: String,
    #[serde(rename = "Nº de vagas")]
    pub count: usize,
}

/// How a posting expects people to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentMode {
    Remote,
    Hybrid,
    Onsite,
    Other,
}

impl EmploymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentMode::Remote => "remote",
            EmploymentMode::Hybrid => "hybrid",
            EmploymentMode::Onsite => "onsite",
            EmploymentMode::Other => "other",
        }
    }
}

impl fmt::Display for EmploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
