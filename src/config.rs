//! Runtime configuration.
//!
//! Every value has a default, so the tool runs without a config file. A YAML
//! file passed with `--config` may override any subset of sections:
//!
//! ```yaml
//! listings:
//!   timeout_secs: 15
//! skills:
//!   max_pages: 50
//!   vocabulary: [rust, go, python]
//! ```
//!
//! The listings credential never comes from the file; it is taken from the
//! `ITJOBS_API_KEY` environment variable (or `--api-key`) and threaded into
//! the client constructor.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Placeholder value shipped in sample environments; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "AQUI_A_TUA_API_KEY";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listings: ListingsConfig,
    pub review_site: ReviewSiteConfig,
    pub skills: SkillsConfig,
    pub statistics: StatisticsConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Filled from the environment / CLI, never from YAML.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.itjobs.pt".to_string(),
            timeout_secs: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
            api_key: None,
        }
    }
}

impl ListingsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The credential, if one is usable.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingApiKey`] when the key is absent, blank or still the
    /// placeholder value.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && key != API_KEY_PLACEHOLDER => Ok(key),
            _ => Err(AppError::MissingApiKey),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewSiteConfig {
    /// Site root; company pages live under `{root_url}/companies/`.
    pub root_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ReviewSiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://pt.teamlyzer.com".to_string(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (compatible; TeamlyzerScraper/1.0)".to_string(),
        }
    }
}

impl ReviewSiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Closed vocabulary, in declaration order (ties in the ranking keep it).
    pub vocabulary: Vec<String>,
    pub page_size: usize,
    /// Hard cap on fetched pages. Large date ranges are truncated at this point.
    pub max_pages: usize,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        let vocabulary = [
            "python", "r", "sql", "docker", "aws", "git", "tensorflow", "pandas", "numpy",
            "javascript", "java", "c#", "c++", "scala", "spark", "react", "node",
        ];
        Self {
            vocabulary: vocabulary.iter().map(|s| s.to_string()).collect(),
            page_size: 100,
            max_pages: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub max_pages: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { max_pages: 200 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Records requested from the search operation before local filtering.
    pub fetch_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { fetch_limit: 100 }
    }
}

impl Config {
    /// Build the configuration from an optional YAML file plus the credential.
    #[instrument(level = "info", skip(api_key))]
    pub fn load(path: Option<&str>, api_key: Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
                    path: path.to_string(),
                    source,
                })?;
                let config = Self::from_yaml(&text)?;
                info!(path, "Loaded configuration file");
                config
            }
            None => Self::default(),
        };
        config.listings.api_key = api_key;
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listings.base_url, "https://api.itjobs.pt");
        assert_eq!(config.listings.timeout(), Duration::from_secs(10));
        assert_eq!(config.review_site.timeout(), Duration::from_secs(15));
        assert_eq!(config.skills.max_pages, 20);
        assert_eq!(config.skills.page_size, 100);
        assert_eq!(config.skills.vocabulary.len(), 17);
        assert_eq!(config.skills.vocabulary[12], "c++");
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = "skills:\n  max_pages: 5\nreview_site:\n  timeout_secs: 3\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.skills.max_pages, 5);
        assert_eq!(config.skills.page_size, 100);
        assert_eq!(config.review_site.timeout_secs, 3);
        assert_eq!(config.review_site.root_url, "https://pt.teamlyzer.com");
        assert_eq!(config.listings.timeout_secs, 10);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("  \n").unwrap();
        assert_eq!(config.search.fetch_limit, 100);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(matches!(
            Config::from_yaml("skills: [oops"),
            Err(AppError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_api_key_validation() {
        let mut listings = ListingsConfig::default();
        assert!(matches!(listings.require_api_key(), Err(AppError::MissingApiKey)));

        listings.api_key = Some("   ".into());
        assert!(listings.require_api_key().is_err());

        listings.api_key = Some(API_KEY_PLACEHOLDER.into());
        assert!(listings.require_api_key().is_err());

        listings.api_key = Some("abc123".into());
        assert_eq!(listings.require_api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some("/definitely/not/here.yaml"), None).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }
}
