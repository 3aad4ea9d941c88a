use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use anyhow::{Context, Result};
use tokio_stream::{StreamExt, wrappers::WatchStream};
use tracing::{Instrument, debug, error, info, info_span, instrument};

use crate::{
    catalog::TmdbDataSource,
    models::{MovieDetailCard, MovieRow, Settings},
    pagination::{CatalogQuery, PaginationController},
};

/// Wires the catalog to the active settings and renders display values.
pub struct MovieHub {
    controller: PaginationController,
    settings: Mutex<Settings>,
    image_base_url: RwLock<String>,
}

impl MovieHub {
    /// Builds the catalog from the first settings value and follows later ones.
    #[instrument(skip(settings_stream))]
    pub async fn new(mut settings_stream: WatchStream<Settings>) -> Result<Arc<Self>> {
        let settings = settings_stream.next().await.context("Settings stream closed on hub init")?;
        let source = TmdbDataSource::from_settings(&settings)
            .context("Failed to create catalog data source")?;
        if settings.effective_api_key().is_none() {
            info!("No API key configured, requests will be sent without one");
        }

        let hub = Arc::new(Self {
            controller: PaginationController::new(
                Arc::new(source),
                CatalogQuery::from_settings(&settings),
            ),
            image_base_url: RwLock::new(settings.image_base_url.clone()),
            settings: Mutex::new(settings),
        });

        let weak = Arc::downgrade(&hub);
        tokio::spawn(
            async move {
                info!("Starting to listen for settings changes");
                while let Some(settings) = settings_stream.next().await {
                    let Some(hub) = Weak::upgrade(&weak) else { break };
                    hub.apply_settings(settings);
                }
                debug!("Settings listener stopped");
            }
            .instrument(info_span!("task_handle_settings_updates")),
        );

        Ok(hub)
    }

    fn apply_settings(&self, settings: Settings) {
        let mut current = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == settings {
            return;
        }
        debug!(?settings, "Hub received settings update");

        if current.catalog_changed(&settings) {
            match TmdbDataSource::from_settings(&settings) {
                Ok(source) => {
                    info!("Catalog settings changed, reconfiguring");
                    self.controller
                        .reconfigure(Arc::new(source), CatalogQuery::from_settings(&settings));
                }
                Err(e) => {
                    error!(
                        error = &e as &dyn std::error::Error,
                        "Failed to apply catalog settings, keeping the previous source"
                    );
                    return;
                }
            }
        }

        let mut image_base_url =
            self.image_base_url.write().unwrap_or_else(PoisonError::into_inner);
        if *image_base_url != settings.image_base_url {
            info!(url = %settings.image_base_url, "Image base URL changed");
            *image_base_url = settings.image_base_url.clone();
        }
        *current = settings;
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    /// Display values for the current list.
    pub fn rows(&self) -> Vec<MovieRow> {
        let movies = self.controller.subscribe_movies().borrow().clone();
        let base = self.image_base_url.read().unwrap_or_else(PoisonError::into_inner);
        movies.iter().map(|m| MovieRow::new(m, &base)).collect()
    }

    /// Display values for the loaded detail, if any.
    pub fn detail_card(&self) -> Option<MovieDetailCard> {
        let state = self.controller.detail().state();
        let base = self.image_base_url.read().unwrap_or_else(PoisonError::into_inner);
        state.movie().map(|m| MovieDetailCard::new(m, &base))
    }
}
