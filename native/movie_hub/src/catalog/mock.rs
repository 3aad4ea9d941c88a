use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{MovieDataSource, SortMovies};
use crate::{
    error::{CatalogError, CatalogResult},
    models::{Movie, MovieId, MoviePage},
};

pub(crate) const CHARLIE_BROWN_PAGE_JSON: &str = r#"{
    "page": 1,
    "results": [{
        "adult": false,
        "backdrop_path": "/gSIoLWHbNR1fDKd6hLQjoLFT7Ov.jpg",
        "genre_ids": [16, 10751, 35, 10770],
        "id": 13187,
        "original_language": "en",
        "original_title": "A Charlie Brown Christmas",
        "overview": "When Charlie Brown complains about the overwhelming materialism that he sees amongst everyone during the Christmas season, Lucy suggests that he become director of the school Christmas pageant.",
        "popularity": 11.464,
        "poster_path": "/6UnkNFYKrrUOCC8Tm9oOWZk597M.jpg",
        "release_date": "1965-12-09",
        "title": "A Charlie Brown Christmas",
        "video": false,
        "vote_average": 7.7,
        "vote_count": 388
    }],
    "total_pages": 500,
    "total_results": 10000
}"#;

pub(crate) const SECRET_LIFE_OF_PETS_JSON: &str = r#"{
    "adult": false,
    "backdrop_path": "/nOK6mVgBUkt7IVSfesVVJd4i5uU.jpg",
    "belongs_to_collection": {
        "id": 427084,
        "name": "The Secret Life of Pets Collection",
        "poster_path": "/d83LVydlQonKdshwQyLYx48D3LH.jpg",
        "backdrop_path": "/lB4l8H0jgPp2bf4NV2aZPIyytdQ.jpg"
    },
    "budget": 75000000,
    "genres": [{"id": 12, "name": "Adventure"}],
    "homepage": "http://www.thesecretlifeofpets.com/",
    "id": 328111,
    "imdb_id": "tt2709768",
    "original_language": "en",
    "original_title": "The Secret Life of Pets",
    "overview": "The quiet life of a terrier named Max is upended when his owner takes in Duke, a stray whom Max instantly dislikes.",
    "popularity": 13.422,
    "poster_path": "/gJo9G56QlXKRe2tcdDVSt28xVsP.jpg",
    "production_companies": [
        {"id": 33, "logo_path": "/8lvHyhjr8oUKOOy2dKXoALWKdp0.png", "name": "Universal Pictures", "origin_country": "US"},
        {"id": 3341, "logo_path": "/dTG5dXE1kU2mpmL9BNnraffckLU.png", "name": "Fuji Television Network", "origin_country": "JP"}
    ],
    "production_countries": [{"iso_3166_1": "US", "name": "United States of America"}],
    "release_date": "2016-06-18",
    "revenue": 875457937,
    "runtime": 87,
    "spoken_languages": [{"english_name": "English", "iso_639_1": "en", "name": "English"}],
    "status": "Released",
    "tagline": "Think this is what they do all day?",
    "title": "The Secret Life of Pets",
    "video": false,
    "vote_average": 6.2,
    "vote_count": 6542
}"#;

pub(crate) fn movie(id: MovieId, title: &str) -> Movie {
    Movie { id, title: title.to_string(), ..Default::default() }
}

pub(crate) fn page(number: u32, total_pages: u32, ids: &[MovieId]) -> MoviePage {
    MoviePage {
        page: number,
        movies: ids.iter().map(|id| movie(*id, &format!("Movie {id}"))).collect(),
        total_pages,
        total_results: total_pages.saturating_mul(20),
    }
}

pub(crate) fn charlie_brown_page() -> MoviePage {
    serde_json::from_str(CHARLIE_BROWN_PAGE_JSON).expect("fixture should parse")
}

/// In-memory [`MovieDataSource`] with call recording and per-request gates.
#[derive(Default)]
pub(crate) struct MockDataSource {
    pages: Mutex<HashMap<u32, CatalogResult<MoviePage>>>,
    /// Served for pages without an explicit entry
    fallback_page: Mutex<Option<MoviePage>>,
    movies: Mutex<HashMap<MovieId, CatalogResult<Movie>>>,
    page_gates: Mutex<HashMap<u32, Arc<Semaphore>>>,
    detail_gates: Mutex<HashMap<MovieId, Arc<Semaphore>>>,
    page_calls: Mutex<Vec<u32>>,
    detail_calls: Mutex<Vec<MovieId>>,
}

impl MockDataSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(self, page: MoviePage) -> Self {
        self.pages.lock().unwrap().insert(page.page, Ok(page));
        self
    }

    pub(crate) fn with_page_error(self, number: u32, error: CatalogError) -> Self {
        self.pages.lock().unwrap().insert(number, Err(error));
        self
    }

    /// Answers every page request with `page`, whatever number was asked for.
    pub(crate) fn with_any_page(self, page: MoviePage) -> Self {
        *self.fallback_page.lock().unwrap() = Some(page);
        self
    }

    pub(crate) fn with_movie(self, movie: Movie) -> Self {
        self.movies.lock().unwrap().insert(movie.id, Ok(movie));
        self
    }

    pub(crate) fn with_movie_error(self, movie_id: MovieId, error: CatalogError) -> Self {
        self.movies.lock().unwrap().insert(movie_id, Err(error));
        self
    }

    pub(crate) fn set_page(&self, page: MoviePage) {
        self.pages.lock().unwrap().insert(page.page, Ok(page));
    }

    pub(crate) fn set_page_error(&self, number: u32, error: CatalogError) {
        self.pages.lock().unwrap().insert(number, Err(error));
    }

    /// Holds requests for `number` until permits are added to the returned semaphore.
    pub(crate) fn gate_page(&self, number: u32) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.page_gates.lock().unwrap().insert(number, gate.clone());
        gate
    }

    pub(crate) fn gate_movie(&self, movie_id: MovieId) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.detail_gates.lock().unwrap().insert(movie_id, gate.clone());
        gate
    }

    pub(crate) fn page_calls(&self) -> Vec<u32> {
        self.page_calls.lock().unwrap().clone()
    }

    pub(crate) fn detail_calls(&self) -> Vec<MovieId> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieDataSource for MockDataSource {
    async fn movies(
        &self,
        _primary_release_date_lte: &str,
        _sort_by: SortMovies,
        page: u32,
    ) -> CatalogResult<MoviePage> {
        self.page_calls.lock().unwrap().push(page);

        let gate = self.page_gates.lock().unwrap().get(&page).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let response = self.pages.lock().unwrap().get(&page).cloned();
        match response {
            Some(result) => result,
            None => self.fallback_page.lock().unwrap().clone().ok_or_else(|| {
                CatalogError::Network(format!("HTTP status client error (404 Not Found) for page {page}"))
            }),
        }
    }

    async fn movie_details(&self, movie_id: MovieId) -> CatalogResult<Movie> {
        self.detail_calls.lock().unwrap().push(movie_id);

        let gate = self.detail_gates.lock().unwrap().get(&movie_id).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        self.movies.lock().unwrap().get(&movie_id).cloned().unwrap_or_else(|| {
            Err(CatalogError::Network("HTTP status client error (404 Not Found)".into()))
        })
    }
}
