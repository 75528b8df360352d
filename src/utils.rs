//! Small helpers shared by the extractors, the resolver and the scraper.
//!
//! - [`first_hit`]: the "try candidates in order, keep the first success" probe
//! - JSON value helpers for loosely typed records
//! - Text folding used for fuzzy company matching and slug guessing

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NOT_ALNUM_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9 ]+").unwrap());
static NOT_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Run `probe` over `candidates` in order and return the first `Some`.
///
/// Candidates can be anything: record keys, CSS selectors, or parsing
/// strategies (`fn(&str) -> Option<T>`).
///
/// # Examples
///
/// ```ignore
/// let hit = first_hit(["a", "bb", "ccc"], |s| (s.len() > 1).then(|| s.len()));
/// assert_eq!(hit, Some(2));
/// ```
pub fn first_hit<C, T>(
    candidates: impl IntoIterator<Item = C>,
    probe: impl FnMut(C) -> Option<T>,
) -> Option<T> {
    candidates.into_iter().find_map(probe)
}

/// `Some(s)` unless `s` is empty after trimming.
pub fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Render a JSON value as plain text.
///
/// Strings are returned verbatim, `null` becomes the empty string, and
/// everything else uses its compact JSON form.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Whether a value carries something worth reporting.
///
/// Empty strings, zero, `false`, `null` and empty collections do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The `name` of every object in an array of `{"name": ...}` objects, trimmed.
///
/// An object without a string `name` contributes `""`; blank names are kept.
/// Non-array input and non-object elements yield nothing.
pub fn object_names(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| {
                    item.get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Replace every whitespace run with a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").into_owned()
}

/// Fold text for fuzzy comparison.
///
/// Lowercases, collapses whitespace and drops everything that is not an
/// ASCII letter, digit or space.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text("  ACME,  Lda. "), "acme lda");
/// ```
pub fn normalize_text(s: &str) -> String {
    let lowered = collapse_whitespace(&s.to_lowercase());
    NOT_ALNUM_SPACE.replace_all(&lowered, "").into_owned()
}

/// Derive a URL slug from a company name.
///
/// Apostrophes are removed, runs of other non-alphanumerics become one
/// hyphen, and leading/trailing hyphens are trimmed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_company_name("McDonald's Portugal"), "mcdonalds-portugal");
/// assert_eq!(slugify_company_name("  --  "), "");
/// ```
pub fn slugify_company_name(name: &str) -> String {
    let lowered = name
        .trim()
        .to_lowercase()
        .replace(['\'', '’', '`'], "");
    NOT_ALNUM_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
