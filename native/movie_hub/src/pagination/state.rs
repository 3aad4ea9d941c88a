use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{
    Movie, MoviePage, PageBoundary,
    signals::catalog::{CatalogSnapshot, LoadStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    FirstLoad,
    NextPage,
}

/// Tag attached to every issued page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageTicket {
    pub kind: RequestKind,
    /// Refresh generation the request was issued in
    pub generation: u64,
    pub page: u32,
}

/// What a completion did to the accumulated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    Replaced,
    Appended,
    /// First load failed and the list was emptied
    Cleared,
    /// Next page failed, list untouched
    Kept,
    /// Next page came back empty past the last page
    EndReached,
    /// The completion no longer matches the state and was ignored
    Stale,
}

impl Applied {
    pub(crate) fn changed_movies(self) -> bool {
        matches!(self, Applied::Replaced | Applied::Appended | Applied::Cleared)
    }
}

/// Paging state owned by the catalog actor.
///
/// Each handler is synchronous; issuing the request a ticket describes is up to
/// the caller.
#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub movies: Arc<Vec<Movie>>,
    pub current_page: u32,
    pub total_pages: u32,
    pub last_error: Option<String>,
    first_load: Option<PageTicket>,
    next_page: Option<PageTicket>,
    generation: u64,
    /// Set once a next page comes back empty past the end, until the next first load
    end_reached: bool,
}

impl CatalogState {
    pub(crate) fn status(&self) -> LoadStatus {
        LoadStatus { first_load: self.first_load.is_some(), next_page: self.next_page.is_some() }
    }

    pub(crate) fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            movies: self.movies.clone(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            status: self.status(),
            last_error: self.last_error.clone(),
        }
    }

    /// Returns the ticket for page 1, or `None` if a first load is already in flight.
    pub(crate) fn on_refresh(&mut self) -> Option<PageTicket> {
        if self.first_load.is_some() {
            return None;
        }
        self.generation += 1;
        let ticket =
            PageTicket { kind: RequestKind::FirstLoad, generation: self.generation, page: 1 };
        self.first_load = Some(ticket);
        Some(ticket)
    }

    /// Returns the ticket for the next page, or `None` if a next-page request is
    /// in flight or `boundary` says there is nothing more to load.
    pub(crate) fn on_load_more(&mut self, boundary: PageBoundary) -> Option<PageTicket> {
        if self.next_page.is_some() || self.end_reached {
            return None;
        }
        let Some(page) = self.current_page.checked_add(1) else {
            debug!(current_page = self.current_page, "No page after the current one");
            return None;
        };
        if !boundary.allows(page, self.total_pages) {
            debug!(page, total_pages = self.total_pages, ?boundary, "No more pages to load");
            return None;
        }
        let ticket = PageTicket { kind: RequestKind::NextPage, generation: self.generation, page };
        self.next_page = Some(ticket);
        Some(ticket)
    }

    pub(crate) fn on_page_loaded(&mut self, ticket: PageTicket, page: MoviePage) -> Applied {
        if !self.finish(ticket) || ticket.generation != self.generation {
            return Applied::Stale;
        }

        match ticket.kind {
            RequestKind::FirstLoad => {
                self.current_page = page.page;
                self.total_pages = page.total_pages;
                self.movies = Arc::new(page.movies);
                self.last_error = None;
                self.end_reached = false;
                Applied::Replaced
            }
            RequestKind::NextPage => {
                if Some(ticket.page) != self.current_page.checked_add(1) {
                    debug!(
                        requested = ticket.page,
                        current_page = self.current_page,
                        "Dropping next page that no longer follows the current one"
                    );
                    return Applied::Stale;
                }
                if page.is_past_end() {
                    self.end_reached = true;
                    return Applied::EndReached;
                }
                if page.page != ticket.page {
                    warn!(requested = ticket.page, received = page.page, "Server returned a different page");
                }
                self.current_page = ticket.page;
                Arc::make_mut(&mut self.movies).extend(page.movies);
                Applied::Appended
            }
        }
    }

    pub(crate) fn on_page_failed(&mut self, ticket: PageTicket, message: &str) -> Applied {
        if !self.finish(ticket) || ticket.generation != self.generation {
            return Applied::Stale;
        }

        self.last_error = Some(message.to_string());
        match ticket.kind {
            RequestKind::FirstLoad => {
                self.movies = Arc::new(Vec::new());
                self.current_page = 0;
                self.total_pages = 0;
                self.end_reached = false;
                Applied::Cleared
            }
            RequestKind::NextPage => Applied::Kept,
        }
    }

    /// Forgets every in-flight request. Their completions will be ignored.
    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
        self.first_load = None;
        self.next_page = None;
        self.end_reached = false;
    }

    /// Clears the in-flight slot `ticket` occupies. Returns false if it does not occupy one.
    fn finish(&mut self, ticket: PageTicket) -> bool {
        let slot = match ticket.kind {
            RequestKind::FirstLoad => &mut self.first_load,
            RequestKind::NextPage => &mut self.next_page,
        };
        if *slot == Some(ticket) {
            *slot = None;
            true
        } else {
            false
        }
    }
}
