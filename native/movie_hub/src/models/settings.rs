use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// How far "load more" is allowed to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageBoundary {
    /// Next page is requested while `current + 1 != total_pages`, which stops
    /// one page before the last one. This is the shipped behavior.
    #[default]
    StopBeforeLast,
    /// Next page is requested while `current + 1 <= total_pages`.
    Inclusive,
}

impl PageBoundary {
    pub fn allows(self, next_page: u32, total_pages: u32) -> bool {
        match self {
            PageBoundary::StopBeforeLast => next_page != total_pages,
            PageBoundary::Inclusive => total_pages == 0 || next_page <= total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base of the catalog API, e.g. `https://api.themoviedb.org/3/`
    pub api_base_url: String,
    /// Sent as the `api_key` query parameter when not empty
    pub api_key: String,
    /// Prefix for poster and backdrop paths
    pub image_base_url: String,
    /// Sent as the `language` query parameter when not empty
    pub language: String,
    /// Upper bound for `primary_release_date.lte`, formatted `YYYY-MM-DD`
    pub release_date_lte: String,
    pub request_timeout_secs: u64,
    pub page_boundary: PageBoundary,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.themoviedb.org/3/".to_string(),
            api_key: String::new(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            language: String::new(),
            release_date_lte: "2020-01-01".to_string(),
            request_timeout_secs: 15,
            page_boundary: PageBoundary::StopBeforeLast,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;
        ensure!(
            matches!(url.scheme(), "http" | "https"),
            "API base URL must start with http:// or https://"
        );
        Date::parse(&self.release_date_lte, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("Invalid release date: {}", self.release_date_lte))?;
        ensure!(self.request_timeout_secs > 0, "Request timeout must be greater than zero");
        Ok(())
    }

    /// The configured key, or the one from [`API_KEY_ENV`] if none is configured.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key_or(|| std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: impl FnOnce() -> Option<String>) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        fallback().filter(|k| !k.is_empty())
    }

    /// Whether switching from `self` to `other` requires a new data source.
    pub fn catalog_changed(&self, other: &Settings) -> bool {
        self.api_base_url != other.api_base_url
            || self.api_key != other.api_key
            || self.language != other.language
            || self.release_date_lte != other.release_date_lte
            || self.request_timeout_secs != other.request_timeout_secs
            || self.page_boundary != other.page_boundary
    }
}
