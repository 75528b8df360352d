//! Field extraction from loosely typed listings records.
//!
//! Every function here is total: a missing or misshapen field produces an
//! empty string, an empty list or `None`, never an error.

use super::dates::{from_unix_timestamp, parse_flexible_date};
use crate::models::{NormalizedJob, RawRecord};
use crate::utils::{first_hit, is_truthy, non_empty, value_to_text};
use chrono::NaiveDateTime;
use serde_json::Value;

/// Keys that may hold a publication date, most specific first.
const DATE_KEYS: [&str; 10] = [
    "published",
    "published_at",
    "publication_date",
    "posted",
    "posted_at",
    "date",
    "created",
    "created_at",
    "publish_date",
    "date_posted",
];

const SALARY_KEYS: [&str; 6] = [
    "salary",
    "salary_description",
    "salary_text",
    "remuneration",
    "salary_min",
    "salary_max",
];

fn str_field<'a>(record: &'a RawRecord, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Best guess at when a posting was published.
///
/// Known date keys are probed in order (numbers are Unix timestamps, strings
/// go through [`parse_flexible_date`]); when none yields a date, the title
/// and body are scanned as a last resort.
pub fn extract_publication_date(record: &RawRecord) -> Option<NaiveDateTime> {
    first_hit(DATE_KEYS, |key| match record.get(key)? {
        Value::String(s) => parse_flexible_date(s),
        Value::Number(n) => n.as_f64().and_then(from_unix_timestamp),
        _ => None,
    })
    .or_else(|| {
        let text = [str_field(record, "title"), str_field(record, "body")]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        parse_flexible_date(&text)
    })
}

/// The employer's name: `company.name`, or `company` itself when it is a string.
pub fn extract_company_name(record: &RawRecord) -> String {
    match record.get("company") {
        Some(Value::Object(company)) => company
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::String(name)) => name.clone(),
        _ => String::new(),
    }
}

/// Salary as free text, from the first populated salary-like key or `contract.salary`.
pub fn extract_salary_text(record: &RawRecord) -> String {
    first_hit(SALARY_KEYS, |key| {
        record
            .get(key)
            .filter(|value| is_truthy(value))
            .map(value_to_text)
    })
    .or_else(|| {
        record
            .get("contract")
            .and_then(|contract| contract.get("salary"))
            .map(value_to_text)
    })
    .unwrap_or_default()
}

/// Location names in source order, empties dropped.
///
/// Array elements contribute their `name` (objects) or their text form; any
/// other non-null value is taken as a single location.
pub fn extract_location_names(record: &RawRecord) -> Vec<String> {
    match record.get("locations") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(location) => location
                    .get("name")
                    .map(value_to_text)
                    .unwrap_or_default(),
                other => value_to_text(other),
            })
            .filter(|name| !name.is_empty())
            .collect(),
        Some(other) => non_empty(value_to_text(other)).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Location names joined with `", "`.
pub fn extract_locations_text(record: &RawRecord) -> String {
    extract_location_names(record).join(", ")
}

/// Body text, falling back to `description`.
pub fn extract_description(record: &RawRecord) -> String {
    first_hit(["body", "description"], |key| {
        non_empty(str_field(record, key).to_string())
    })
    .unwrap_or_default()
}

pub fn normalize_job(record: &RawRecord) -> NormalizedJob {
    NormalizedJob {
        id: record.get("id").and_then(|id| non_empty(value_to_text(id))),
        title: str_field(record, "title").to_string(),
        description: extract_description(record),
        company_name: extract_company_name(record),
        publication_date: extract_publication_date(record),
        salary_text: extract_salary_text(record),
        location_names: extract_location_names(record),
    }
}
