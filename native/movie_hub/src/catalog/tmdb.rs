use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{MovieDataSource, SortMovies};
use crate::{
    error::{CatalogError, CatalogResult},
    models::{Movie, MovieId, MoviePage, Settings},
};

/// [`MovieDataSource`] backed by the TMDB v3 REST API.
#[derive(Debug, Clone)]
pub struct TmdbDataSource {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    language: Option<String>,
}

impl TmdbDataSource {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        language: Option<String>,
        timeout: Duration,
    ) -> CatalogResult<Self> {
        let base_url = parse_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url, api_key, language })
    }

    pub fn from_settings(settings: &Settings) -> CatalogResult<Self> {
        Self::new(
            &settings.api_base_url,
            settings.effective_api_key(),
            Some(settings.language.clone()).filter(|l| !l.is_empty()),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidRequest(format!("Invalid URL for {path}: {e}")))
    }

    fn common_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }
        if let Some(language) = &self.language {
            query.push(("language", language.clone()));
        }
        query
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> CatalogResult<T> {
        let resp = self.client.get(url).query(query).send().await?;
        resp.error_for_status_ref()?;
        Ok(resp.json().await?)
    }
}

fn parse_base_url(base: &str) -> CatalogResult<Url> {
    // Without the trailing slash `join` would replace the last path segment
    let normalized = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
    let url = Url::parse(&normalized)
        .map_err(|e| CatalogError::InvalidRequest(format!("Invalid base URL {base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(CatalogError::InvalidRequest(format!("Base URL {base} cannot be a base")));
    }
    Ok(url)
}

#[async_trait]
impl MovieDataSource for TmdbDataSource {
    #[instrument(level = "debug", skip(self), err)]
    async fn movies(
        &self,
        primary_release_date_lte: &str,
        sort_by: SortMovies,
        page: u32,
    ) -> CatalogResult<MoviePage> {
        let url = self.endpoint("discover/movie")?;
        debug!(%url, "Fetching movie page");

        let mut query = self.common_query();
        query.push(("primary_release_date.lte", primary_release_date_lte.to_string()));
        query.push(("sort_by", sort_by.as_str().to_string()));
        query.push(("page", page.to_string()));

        let response: MoviePage = self.get_json(url, &query).await?;
        response.check_bounds()?;
        debug!(
            page = response.page,
            count = response.movies.len(),
            total_pages = response.total_pages,
            "Fetched movie page"
        );
        Ok(response)
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn movie_details(&self, movie_id: MovieId) -> CatalogResult<Movie> {
        let url = self.endpoint(&format!("movie/{movie_id}"))?;
        debug!(%url, "Fetching movie details");

        let movie: Movie = self.get_json(url, &self.common_query()).await?;
        Ok(movie)
    }
}
