//! Remote / hybrid / on-site classification of a single posting.

use crate::models::{EmploymentMode, RawRecord};
use serde_json::Value;

/// Keyword sets in priority order; the first set with a hit wins.
const MODE_KEYWORDS: [(EmploymentMode, &[&str]); 3] = [
    (EmploymentMode::Remote, &["remote", "remoto"]),
    (EmploymentMode::Hybrid, &["híbr", "hibr"]),
    (EmploymentMode::Onsite, &["presencial", "on-site"]),
];

/// Classify a posting by keywords in its title, body, contract, types and locations.
///
/// A posting mentioning both "remote" and "on-site" is remote.
pub fn classify_employment_mode(record: &RawRecord) -> EmploymentMode {
    let blob = classification_text(record);
    MODE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| blob.contains(k)))
        .map(|(mode, _)| *mode)
        .unwrap_or(EmploymentMode::Other)
}

fn classification_text(record: &RawRecord) -> String {
    let mut blob = String::new();
    for key in ["title", "body"] {
        if let Some(text) = record.get(key).and_then(Value::as_str) {
            blob.push_str(text);
            blob.push(' ');
        }
    }
    for key in ["contract", "types", "locations"] {
        let value = record.get(key).unwrap_or(&Value::Null);
        blob.push_str(&value.to_string());
    }
    blob.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> EmploymentMode {
        classify_employment_mode(value.as_object().unwrap())
    }

    #[test]
    fn test_remote_wins_over_onsite() {
        let mode = classify(json!({"title": "Dev", "body": "Remote first, occasional on-site visits"}));
        assert_eq!(mode, EmploymentMode::Remote);
    }

    #[test]
    fn test_hybrid_from_types() {
        let mode = classify(json!({"title": "Dev", "types": [{"id": 5, "name": "Híbrido"}]}));
        assert_eq!(mode, EmploymentMode::Hybrid);
    }

    #[test]
    fn test_onsite_from_body() {
        assert_eq!(classify(json!({"body": "Trabalho presencial em Lisboa"})), EmploymentMode::Onsite);
    }

    #[test]
    fn test_remote_from_locations() {
        let mode = classify(json!({"title": "QA", "locations": [{"name": "Remoto"}]}));
        assert_eq!(mode, EmploymentMode::Remote);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify(json!({"title": "Data Engineer"})), EmploymentMode::Other);
        assert_eq!(classify(json!({})), EmploymentMode::Other);
    }
}
