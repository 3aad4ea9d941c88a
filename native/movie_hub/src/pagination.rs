//! Paged movie list with single-flight refresh and "load more".

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, error, info, instrument, warn};

use crate::{
    catalog::{MovieDataSource, SortMovies},
    detail::DetailFetcher,
    error::CatalogError,
    models::{
        Movie, MovieId, MoviePage, PageBoundary, Settings,
        signals::catalog::{CatalogSnapshot, LoadStatus},
    },
};

mod state;
use state::{Applied, CatalogState, PageTicket};

/// Parameters of the discover query and the paging policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// `primary_release_date.lte` sent with every page request
    pub release_date_lte: String,
    pub sort_by: SortMovies,
    pub page_boundary: PageBoundary,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CatalogQuery {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            release_date_lte: settings.release_date_lte.clone(),
            sort_by: SortMovies::ReleaseDateDesc,
            page_boundary: settings.page_boundary,
        }
    }
}

enum CatalogEvent {
    Refresh,
    LoadMore,
    PageLoaded { ticket: PageTicket, page: MoviePage },
    PageFailed { ticket: PageTicket, error: CatalogError },
    Reconfigure { source: Arc<dyn MovieDataSource>, query: CatalogQuery },
    Snapshot(oneshot::Sender<CatalogSnapshot>),
}

/// Handle to the catalog actor.
///
/// All trigger methods return immediately; the actor applies them in order.
/// Must be created inside a tokio runtime. Dropping the handle stops the actor.
pub struct PaginationController {
    events: mpsc::UnboundedSender<CatalogEvent>,
    movies_rx: watch::Receiver<Arc<Vec<Movie>>>,
    status_rx: watch::Receiver<LoadStatus>,
    errors_tx: broadcast::Sender<String>,
    detail: DetailFetcher,
    shutdown: CancellationToken,
}

impl PaginationController {
    pub fn new(source: Arc<dyn MovieDataSource>, query: CatalogQuery) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (movies_tx, movies_rx) = watch::channel(Arc::new(Vec::new()));
        let (status_tx, status_rx) = watch::channel(LoadStatus::default());
        let (errors_tx, _) = broadcast::channel(16);
        let shutdown = CancellationToken::new();

        let actor = CatalogActor {
            state: CatalogState::default(),
            source: source.clone(),
            query,
            events_tx: events_tx.clone(),
            movies_tx,
            status_tx,
            errors_tx: errors_tx.clone(),
        };
        tokio::spawn(actor.run(events_rx, shutdown.clone()).instrument(debug_span!("task_catalog")));

        Self {
            events: events_tx,
            movies_rx,
            status_rx,
            errors_tx,
            detail: DetailFetcher::new(source),
            shutdown,
        }
    }

    /// Loads page 1 and replaces the list. Ignored while a first load is in flight.
    ///
    /// The current list stays published until the response arrives; it is not
    /// cleared when the request starts.
    pub fn refresh(&self) {
        self.send(CatalogEvent::Refresh);
    }

    /// Loads the page after the current one and appends it. Ignored while a
    /// next-page request is in flight or when the page boundary is reached.
    pub fn load_next_page(&self) {
        self.send(CatalogEvent::LoadMore);
    }

    /// Starts a detail fetch for the movie at `index` of the current list.
    #[instrument(level = "debug", skip(self), err)]
    pub fn select_item(&self, index: usize) -> Result<MovieId, CatalogError> {
        let movies = self.movies_rx.borrow().clone();
        let movie = movies
            .get(index)
            .ok_or(CatalogError::IndexOutOfBounds { index, len: movies.len() })?;
        self.detail.fetch(movie.id);
        Ok(movie.id)
    }

    /// Replaces the data source and query. In-flight page requests are
    /// abandoned and the list is reloaded if anything had been loaded.
    pub fn reconfigure(&self, source: Arc<dyn MovieDataSource>, query: CatalogQuery) {
        self.detail.set_source(source.clone());
        self.send(CatalogEvent::Reconfigure { source, query });
    }

    /// Accumulated list; the latest value is available right after subscribing.
    pub fn subscribe_movies(&self) -> watch::Receiver<Arc<Vec<Movie>>> {
        self.movies_rx.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LoadStatus> {
        self.status_rx.clone()
    }

    /// User-facing messages of failed page requests.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.errors_tx.subscribe()
    }

    /// Fetcher driven by [`select_item`](Self::select_item).
    pub fn detail(&self) -> &DetailFetcher {
        &self.detail
    }

    /// State after every event sent so far has been handled.
    /// `None` if the actor is gone.
    pub async fn snapshot(&self) -> Option<CatalogSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(CatalogEvent::Snapshot(tx));
        rx.await.ok()
    }

    fn send(&self, event: CatalogEvent) {
        if self.events.send(event).is_err() {
            warn!("Catalog actor stopped, dropping event");
        }
    }
}

impl Drop for PaginationController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct CatalogActor {
    state: CatalogState,
    source: Arc<dyn MovieDataSource>,
    query: CatalogQuery,
    events_tx: mpsc::UnboundedSender<CatalogEvent>,
    movies_tx: watch::Sender<Arc<Vec<Movie>>>,
    status_tx: watch::Sender<LoadStatus>,
    errors_tx: broadcast::Sender<String>,
}

impl CatalogActor {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<CatalogEvent>,
        shutdown: CancellationToken,
    ) {
        debug!("Catalog actor started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        debug!("Catalog actor stopped");
    }

    fn handle(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Refresh => self.on_refresh(),
            CatalogEvent::LoadMore => self.on_load_more(),
            CatalogEvent::PageLoaded { ticket, page } => self.on_page_loaded(ticket, page),
            CatalogEvent::PageFailed { ticket, error } => self.on_page_failed(ticket, error),
            CatalogEvent::Reconfigure { source, query } => self.on_reconfigure(source, query),
            CatalogEvent::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot());
            }
        }
        self.publish_status();
    }

    fn on_refresh(&mut self) {
        match self.state.on_refresh() {
            Some(ticket) => {
                info!(generation = ticket.generation, "Refreshing movie list");
                self.issue(ticket);
            }
            None => debug!("First load already in flight, dropping refresh"),
        }
    }

    fn on_load_more(&mut self) {
        match self.state.on_load_more(self.query.page_boundary) {
            Some(ticket) => {
                info!(page = ticket.page, "Loading next page");
                self.issue(ticket);
            }
            None => debug!(
                current_page = self.state.current_page,
                total_pages = self.state.total_pages,
                next_page_in_flight = self.state.status().next_page,
                "Not loading next page"
            ),
        }
    }

    fn on_page_loaded(&mut self, ticket: PageTicket, page: MoviePage) {
        let count = page.movies.len();
        let applied = self.state.on_page_loaded(ticket, page);
        match applied {
            Applied::Stale => debug!(?ticket, "Ignoring stale page"),
            Applied::EndReached => info!(page = ticket.page, "Reached the end of the catalog"),
            _ => info!(
                page = ticket.page,
                count,
                total = self.state.movies.len(),
                ?applied,
                "Page loaded"
            ),
        }
        self.publish_movies(applied);
    }

    fn on_page_failed(&mut self, ticket: PageTicket, error: CatalogError) {
        let message = error.to_string();
        let applied = self.state.on_page_failed(ticket, &message);
        if applied == Applied::Stale {
            debug!(?ticket, %message, "Ignoring stale page failure");
            return;
        }
        error!(error = &error as &dyn std::error::Error, ?ticket, "Failed to load page");
        self.publish_movies(applied);
        // No receivers is fine
        let _ = self.errors_tx.send(message);
    }

    fn on_reconfigure(&mut self, source: Arc<dyn MovieDataSource>, query: CatalogQuery) {
        info!(?query, "Catalog source reconfigured");
        self.source = source;
        self.query = query;
        let had_pages = self.state.current_page > 0 || self.state.status().first_load;
        self.state.invalidate();
        if had_pages {
            self.on_refresh();
        }
    }

    fn issue(&self, ticket: PageTicket) {
        let source = self.source.clone();
        let query = self.query.clone();
        let events = self.events_tx.clone();
        tokio::spawn(
            async move {
                let event = match source.movies(&query.release_date_lte, query.sort_by, ticket.page).await {
                    Ok(page) => CatalogEvent::PageLoaded { ticket, page },
                    Err(error) => CatalogEvent::PageFailed { ticket, error },
                };
                if events.send(event).is_err() {
                    debug!("Catalog actor gone, dropping page result");
                }
            }
            .instrument(debug_span!("page_request", page = ticket.page, kind = ?ticket.kind)),
        );
    }

    fn publish_movies(&self, applied: Applied) {
        if applied.changed_movies() {
            self.movies_tx.send_replace(self.state.movies.clone());
        }
    }

    fn publish_status(&self) {
        let status = self.state.status();
        self.status_tx.send_if_modified(|current| {
            if *current != status {
                *current = status;
                true
            } else {
                false
            }
        });
    }
}
