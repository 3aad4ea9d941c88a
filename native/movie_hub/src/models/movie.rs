use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogError;

pub type MovieId = u64;

/// A movie as returned by the discover and detail endpoints.
///
/// List responses only carry the summary fields; the detail endpoint fills in
/// genres, runtime and the production metadata.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub video: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub original_language: Option<String>,

    // Detail-only fields
    #[serde(default)]
    pub belongs_to_collection: Option<Collection>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProductionCompany {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_country: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProductionCountry {
    pub iso_3166_1: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpokenLanguage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub english_name: String,
    pub iso_639_1: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// One page of the discover endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    #[serde(rename = "results", default, deserialize_with = "null_as_default")]
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
}

impl MoviePage {
    /// Rejects pages whose number lies outside `1..=total_pages`, except for
    /// an empty page past the end.
    pub fn check_bounds(&self) -> Result<(), CatalogError> {
        if self.is_past_end() {
            return Ok(());
        }
        if self.total_pages > 0 && (self.page == 0 || self.page > self.total_pages) {
            return Err(CatalogError::Decode(format!(
                "page {} is outside of 1..={}",
                self.page, self.total_pages
            )));
        }
        Ok(())
    }

    /// TMDB answers a request beyond the last page with an empty page that
    /// keeps the requested number.
    pub fn is_past_end(&self) -> bool {
        self.movies.is_empty() && self.page > self.total_pages.max(1)
    }
}

/// TMDB sends `null` for some fields that are usually present.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::{CHARLIE_BROWN_PAGE_JSON, SECRET_LIFE_OF_PETS_JSON};

    #[test]
    fn decodes_discover_page() {
        let page: MoviePage = serde_json::from_str(CHARLIE_BROWN_PAGE_JSON).unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 500);
        assert_eq!(page.total_results, 10000);
        assert_eq!(page.movies.len(), 1);

        let movie = &page.movies[0];
        assert_eq!(movie.id, 13187);
        assert_eq!(movie.title, "A Charlie Brown Christmas");
        assert_eq!(movie.genre_ids, vec![16, 10751, 35, 10770]);
        assert_eq!(movie.original_language.as_deref(), Some("en"));
        assert_eq!(movie.backdrop_path.as_deref(), Some("/gSIoLWHbNR1fDKd6hLQjoLFT7Ov.jpg"));
        assert!(movie.genres.is_empty());
        assert_eq!(movie.runtime, None);
        assert!(page.check_bounds().is_ok());
    }

    #[test]
    fn decodes_extended_detail_fields() {
        let movie: Movie = serde_json::from_str(SECRET_LIFE_OF_PETS_JSON).unwrap();

        assert_eq!(movie.id, 328111);
        assert_eq!(movie.runtime, Some(87));
        assert_eq!(movie.genres, vec![Genre { id: 12, name: "Adventure".into() }]);
        assert_eq!(movie.budget, Some(75_000_000));
        assert_eq!(movie.imdb_id.as_deref(), Some("tt2709768"));
        assert_eq!(movie.production_companies.len(), 2);
        assert_eq!(movie.production_countries[0].iso_3166_1, "US");
        assert_eq!(movie.spoken_languages[0].iso_639_1, "en");
        assert_eq!(
            movie.belongs_to_collection.as_ref().map(|c| c.name.as_str()),
            Some("The Secret Life of Pets Collection")
        );
        assert_eq!(movie.tagline.as_deref(), Some("Think this is what they do all day?"));
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let movie: Movie = serde_json::from_str(
            r#"{"id": 7, "title": null, "overview": null, "release_date": null,
                "genre_ids": null, "poster_path": null}"#,
        )
        .unwrap();

        assert_eq!(movie.id, 7);
        assert!(movie.title.is_empty());
        assert!(movie.overview.is_empty());
        assert!(movie.genre_ids.is_empty());
        assert_eq!(movie.poster_path, None);
    }

    #[test]
    fn page_outside_total_is_rejected() {
        let page = MoviePage {
            page: 3,
            movies: vec![Movie::default()],
            total_pages: 2,
            total_results: 40,
        };
        assert!(matches!(page.check_bounds(), Err(CatalogError::Decode(_))));

        let page = MoviePage { page: 0, movies: Vec::new(), total_pages: 2, total_results: 40 };
        assert!(page.check_bounds().is_err());

        let empty = MoviePage { page: 1, movies: Vec::new(), total_pages: 0, total_results: 0 };
        assert!(empty.check_bounds().is_ok());
        assert!(!empty.is_past_end());
    }

    #[test]
    fn empty_page_after_last_is_past_end() {
        let page = MoviePage { page: 2, movies: Vec::new(), total_pages: 1, total_results: 3 };
        assert!(page.is_past_end());
        assert!(page.check_bounds().is_ok());

        let last = MoviePage { page: 1, movies: Vec::new(), total_pages: 1, total_results: 0 };
        assert!(!last.is_past_end());
    }
}
