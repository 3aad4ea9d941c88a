//! This `movie_hub` crate is the
//! entry point of the movie catalog logic.
//!
//! [`PaginationController`] keeps the accumulated movie list and drives
//! page requests against a [`MovieDataSource`]; [`MovieHub`] ties it to the
//! settings stored by [`SettingsHandler`].

use std::path::PathBuf;

use anyhow::{Context, Result};

pub mod catalog;
pub mod detail;
pub mod error;
pub mod hub;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod settings;

pub use catalog::{MovieDataSource, SortMovies, TmdbDataSource};
pub use detail::DetailFetcher;
pub use error::{CatalogError, CatalogResult};
pub use hub::MovieHub;
pub use pagination::{CatalogQuery, PaginationController};
pub use settings::SettingsHandler;

pub const USER_AGENT: &str = concat!("MovieHub/", env!("CARGO_PKG_VERSION"));

/// Per-user data directory holding `settings.json` and `logs/`.
pub fn default_app_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to get data directory")?;
    Ok(data_dir.join("MovieHub"))
}
