use std::sync::Arc;

use serde::Serialize;

use crate::models::Movie;

/// In-flight state of the two catalog request kinds.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStatus {
    /// A first-load (refresh) request is in flight
    pub first_load: bool,
    /// A next-page request is in flight
    pub next_page: bool,
}

impl LoadStatus {
    pub fn is_idle(&self) -> bool {
        !self.first_load && !self.next_page
    }
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub movies: Arc<Vec<Movie>>,
    /// 0 until a page has been loaded
    pub current_page: u32,
    pub total_pages: u32,
    pub status: LoadStatus,
    pub last_error: Option<String>,
}
