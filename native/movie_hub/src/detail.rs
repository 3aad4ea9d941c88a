use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::{broadcast, watch};
use tracing::{Instrument, debug, debug_span, error, info};

use crate::{
    catalog::MovieDataSource,
    models::{MovieId, signals::detail::DetailState},
};

/// Fetches the extended record of one movie at a time.
///
/// A newer [`fetch`](Self::fetch) supersedes the previous one: the older
/// request still completes, but its result is dropped.
#[derive(Clone)]
pub struct DetailFetcher {
    inner: Arc<Inner>,
}

struct Inner {
    source: RwLock<Arc<dyn MovieDataSource>>,
    state_tx: watch::Sender<DetailState>,
    errors_tx: broadcast::Sender<String>,
    /// Only read or written while holding the `state_tx` lock
    generation: AtomicU64,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn MovieDataSource>) -> Self {
        let (state_tx, _) = watch::channel(DetailState::Idle);
        let (errors_tx, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Inner {
                source: RwLock::new(source),
                state_tx,
                errors_tx,
                generation: Default::default(),
            }),
        }
    }

    /// Starts fetching `movie_id`. Must be called inside a tokio runtime.
    pub fn fetch(&self, movie_id: MovieId) {
        let mut generation = 0;
        self.inner.state_tx.send_modify(|state| {
            generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
            *state = DetailState::Loading { movie_id };
        });
        info!(movie_id, generation, "Fetching movie details");

        let source = self.inner.source.read().unwrap_or_else(PoisonError::into_inner).clone();
        let inner = self.inner.clone();
        tokio::spawn(
            async move {
                let result = source.movie_details(movie_id).await;
                let outcome = match result {
                    Ok(movie) => Ok(DetailState::Loaded(Box::new(movie))),
                    Err(e) => Err(e.to_string()),
                };

                let mut error_message = None;
                let applied = inner.state_tx.send_if_modified(|state| {
                    if inner.generation.load(Ordering::Relaxed) != generation {
                        return false;
                    }
                    *state = match &outcome {
                        Ok(loaded) => loaded.clone(),
                        Err(message) => {
                            error_message = Some(message.clone());
                            DetailState::Failed { movie_id, message: message.clone() }
                        }
                    };
                    true
                });

                if !applied {
                    debug!("Superseded by a newer fetch, dropping result");
                    return;
                }
                if let Some(message) = error_message {
                    error!(%message, "Failed to fetch movie details");
                    // No receivers is fine
                    let _ = inner.errors_tx.send(message);
                } else {
                    debug!("Movie details loaded");
                }
            }
            .instrument(debug_span!("detail_request", movie_id, generation)),
        );
    }

    /// Current state; the latest value is available right after subscribing.
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.inner.state_tx.subscribe()
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.inner.errors_tx.subscribe()
    }

    pub fn state(&self) -> DetailState {
        self.inner.state_tx.borrow().clone()
    }

    /// Used by later fetches; one in flight keeps its source.
    pub fn set_source(&self, source: Arc<dyn MovieDataSource>) {
        *self.inner.source.write().unwrap_or_else(PoisonError::into_inner) = source;
    }
}
