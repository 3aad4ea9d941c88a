use serde::Serialize;

use super::{Genre, Movie, MovieId, language::language_name};

/// Values shown for one row of the movie list.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub id: MovieId,
    pub title: String,
    pub overview: String,
    /// Backdrop if available, poster otherwise
    pub image_url: Option<String>,
    pub popularity: f64,
    pub rating: String,
}

impl MovieRow {
    pub fn new(movie: &Movie, image_base_url: &str) -> Self {
        let image_path = movie
            .backdrop_path
            .as_deref()
            .or(movie.poster_path.as_deref())
            .filter(|p| !p.is_empty());
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            image_url: image_path.map(|p| image_url(image_base_url, p)),
            popularity: movie.popularity,
            rating: rating_stars(movie.vote_average),
        }
    }
}

/// Values shown on the detail screen.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MovieDetailCard {
    pub id: MovieId,
    pub title: String,
    pub genres: String,
    /// Display name of the original language, if the code is known
    pub language: Option<String>,
    /// Empty when the runtime is unknown
    pub duration: String,
    pub release_date: String,
    pub popularity: f64,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl MovieDetailCard {
    pub fn new(movie: &Movie, image_base_url: &str) -> Self {
        let url = |path: &Option<String>| {
            path.as_deref().filter(|p| !p.is_empty()).map(|p| image_url(image_base_url, p))
        };
        Self {
            id: movie.id,
            title: movie.title.clone(),
            genres: genre_text(&movie.genres),
            language: movie
                .original_language
                .as_deref()
                .and_then(language_name)
                .map(str::to_string),
            duration: movie.runtime.map(format_runtime).unwrap_or_default(),
            release_date: movie.release_date.clone(),
            popularity: movie.popularity,
            overview: movie.overview.clone(),
            poster_url: url(&movie.poster_path),
            backdrop_url: url(&movie.backdrop_path),
        }
    }
}

/// One star per whole point of the vote average.
pub fn rating_stars(vote_average: f64) -> String {
    let stars = vote_average.clamp(0.0, 10.0).trunc() as usize;
    "⭐️".repeat(stars)
}

/// Genre names separated by `" |"`, e.g. `"Adventure |Comedy"`.
pub fn genre_text(genres: &[Genre]) -> String {
    genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(" |")
}

/// Renders a runtime in minutes as `"1 hour, 27 minutes"`.
pub fn format_runtime(minutes: u32) -> String {
    fn unit(value: u32, name: &str) -> String {
        if value == 1 { format!("1 {name}") } else { format!("{value} {name}s") }
    }

    let (hours, minutes) = (minutes / 60, minutes % 60);
    match (hours, minutes) {
        (0, m) => unit(m, "minute"),
        (h, 0) => unit(h, "hour"),
        (h, m) => format!("{}, {}", unit(h, "hour"), unit(m, "minute")),
    }
}

pub fn image_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
