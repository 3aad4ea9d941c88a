use crate::models::{Movie, MovieId};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        movie_id: MovieId,
    },
    Loaded(Box<Movie>),
    /// The request failed; there is no movie to show.
    Failed {
        movie_id: MovieId,
        message: String,
    },
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading { .. })
    }

    pub fn movie(&self) -> Option<&Movie> {
        match self {
            DetailState::Loaded(movie) => Some(&**movie),
            _ => None,
        }
    }

    pub fn movie_id(&self) -> Option<MovieId> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading { movie_id } | DetailState::Failed { movie_id, .. } => {
                Some(*movie_id)
            }
            DetailState::Loaded(movie) => Some(movie.id),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DetailState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
