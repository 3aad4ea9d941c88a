use std::{error::Error, fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, instrument, trace, warn};

use crate::models::Settings;

/// Owns `settings.json` and publishes the active [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsHandler {
    settings_file_path: PathBuf,
    watch_tx: watch::Sender<Settings>,
}

impl SettingsHandler {
    /// Loads settings from `app_dir`, falling back to defaults when the file is
    /// missing or unusable.
    #[instrument(skip(app_dir))]
    pub fn new(app_dir: PathBuf) -> Arc<Self> {
        let watch_tx = watch::Sender::<Settings>::new(Settings::default());
        let handler =
            Arc::new(Self { settings_file_path: app_dir.join("settings.json"), watch_tx });

        let settings = match handler.load_settings() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = e.as_ref() as &dyn Error, "Failed to load settings, using defaults.");
                handler.load_default_settings()
            }
        };
        handler.on_settings_change(settings);
        handler
    }

    /// Validates, persists and publishes `settings`.
    #[instrument(skip(self, settings))]
    pub fn update(&self, settings: Settings) -> Result<()> {
        settings.validate().context("Refusing to save invalid settings")?;
        self.save_settings(&settings)?;
        self.on_settings_change(settings);
        Ok(())
    }

    fn on_settings_change(&self, settings: Settings) {
        self.watch_tx.send_if_modified(|s| {
            if s != &settings {
                debug!(settings = ?settings, "Active settings changed");
                *s = settings;
                true
            } else {
                trace!("Settings unchanged, not notifying");
                false
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.watch_tx.subscribe()
    }

    pub fn current(&self) -> Settings {
        self.watch_tx.borrow().clone()
    }

    /// Load settings from file or return defaults if file doesn't exist
    #[instrument(skip(self))]
    fn load_settings(&self) -> Result<Settings> {
        if !self.settings_file_path.exists() {
            info!(path = %self.settings_file_path.display(), "Settings file doesn't exist, using defaults");
            return Ok(self.load_default_settings());
        }

        info!(path = %self.settings_file_path.display(), "Loading settings from file");
        let file_content =
            fs::read_to_string(&self.settings_file_path).context("Failed to read settings file")?;
        let settings: Settings =
            serde_json::from_str(&file_content).context("Failed to parse settings file")?;
        settings.validate().context("Settings file contains invalid values")?;

        debug!("Loaded application settings successfully");
        Ok(settings)
    }

    #[instrument(skip(self, settings))]
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        info!(path = %self.settings_file_path.display(), "Saving settings to file");
        let settings_json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        if let Some(parent) = self.settings_file_path.parent()
            && !parent.exists()
        {
            info!(path = %parent.display(), "Creating settings directory");
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }

        fs::write(&self.settings_file_path, settings_json)
            .context("Failed to write settings file")?;

        info!("Saved application settings successfully");
        Ok(())
    }

    /// Defaults, written back to disk when possible.
    #[instrument(skip(self))]
    pub fn load_default_settings(&self) -> Settings {
        info!("Loading default settings");
        let settings = Settings::default();
        if let Err(e) = self.save_settings(&settings) {
            warn!(error = e.as_ref() as &dyn Error, "Failed to save default settings");
        }
        settings
    }
}
