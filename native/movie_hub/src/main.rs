use std::time::Duration;

use anyhow::{Context, Result, bail};
use movie_hub::{MovieHub, SettingsHandler, default_app_dir, logging::setup_logging};
use tokio::time::timeout;
use tokio_stream::wrappers::WatchStream;
use tracing::{error, info};

const WAIT: Duration = Duration::from_secs(30);

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let app_dir = default_app_dir()?;
    std::fs::create_dir_all(&app_dir).context("Failed to create app directory")?;

    let _guard = match setup_logging(&app_dir.join("logs")) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to setup logging: {e:#}");
            None
        }
    };
    info!(app_dir = %app_dir.display(), "Starting movie hub");

    let settings_handler = SettingsHandler::new(app_dir);
    let hub = MovieHub::new(WatchStream::new(settings_handler.subscribe())).await?;
    let controller = hub.controller();
    let mut status = controller.subscribe_status();
    let mut errors = controller.subscribe_errors();

    controller.refresh();
    controller.snapshot().await.context("Catalog stopped")?;
    timeout(WAIT, status.wait_for(|s| s.is_idle())).await.context("Refresh timed out")??;
    if let Ok(message) = errors.try_recv() {
        error!(%message, "Refresh failed");
        bail!("Refresh failed: {message}");
    }

    controller.load_next_page();
    controller.snapshot().await.context("Catalog stopped")?;
    timeout(WAIT, status.wait_for(|s| s.is_idle())).await.context("Next page timed out")??;

    let rows = hub.rows();
    for row in &rows {
        println!("{:>8}  {:<50} {}", row.id, row.title, row.rating);
    }
    println!("{} movies", rows.len());

    if rows.is_empty() {
        return Ok(());
    }
    let mut detail = controller.detail().subscribe();
    controller.select_item(0)?;
    let state = timeout(WAIT, detail.wait_for(|s| !s.is_loading()))
        .await
        .context("Detail request timed out")??
        .clone();
    if let Some(message) = state.error() {
        bail!("Failed to load details: {message}");
    }
    if let Some(card) = hub.detail_card() {
        println!();
        println!("{}", card.title);
        println!("{}", card.genres);
        if let Some(language) = &card.language {
            println!("Language: {language}");
        }
        println!("Duration: {}", card.duration);
        println!("Released: {}", card.release_date);
        println!("{}", card.overview);
    }
    Ok(())
}
