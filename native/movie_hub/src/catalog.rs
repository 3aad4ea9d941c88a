//! Access to the remote movie catalog.

use async_trait::async_trait;

use crate::{
    error::CatalogResult,
    models::{Movie, MovieId, MoviePage},
};

#[cfg(test)]
pub(crate) mod mock;
mod tmdb;
pub use tmdb::TmdbDataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMovies {
    #[default]
    ReleaseDateDesc,
}

impl SortMovies {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMovies::ReleaseDateDesc => "release_date.desc",
        }
    }
}

/// Paginated movie listing and single movie lookup.
#[async_trait]
pub trait MovieDataSource: Send + Sync {
    /// Fetches one page of movies released on or before `primary_release_date_lte`.
    async fn movies(
        &self,
        primary_release_date_lte: &str,
        sort_by: SortMovies,
        page: u32,
    ) -> CatalogResult<MoviePage>;

    /// Fetches the extended record of a single movie.
    async fn movie_details(&self, movie_id: MovieId) -> CatalogResult<Movie>;
}
