pub mod cli;
pub mod core;
pub mod fetcher;
pub mod providers;
pub mod reader;
pub mod scheduler;
pub mod server;
pub mod store;

use crate::cli::show::ShowOptions;
use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::settings::SETTINGS_COLLECTION;
use crate::fetcher::{FetchReport, RateFetcher};
use crate::store::KeyValueStore;
use crate::store::settings::KvSettingsStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Fetch,
    Serve,
    Schedule,
    Show(ShowOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("dzrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(provider = %config.provider.base_url, "Loaded config");

    let store = open_store(&config)?;

    match command {
        AppCommand::Fetch => fetch_once(&config, &store).await,
        AppCommand::Serve => {
            let state = Arc::new(server::AppState {
                fetcher: build_fetcher(&config, &store)?,
            });
            server::serve(&config.server.bind, state, shutdown_signal()).await
        }
        AppCommand::Schedule => {
            let fetcher = build_fetcher(&config, &store)?;
            let job = scheduler::RefreshJob::new(fetcher, &config.schedule);
            job.run_until(shutdown_signal()).await;
            Ok(())
        }
        AppCommand::Show(options) => cli::show::show(&config, &store, &options).await,
    }
}

pub fn open_store(config: &AppConfig) -> Result<KeyValueStore> {
    let path = config.default_data_path()?.join("store");
    KeyValueStore::open(&path)
}

pub fn build_fetcher(config: &AppConfig, store: &dyn Store) -> Result<RateFetcher> {
    let quotes = providers::TraderMadeProvider::new(&config.provider)
        .context("Failed to build quote provider")?;
    let settings = KvSettingsStore::new(store.get_collection(SETTINGS_COLLECTION, true)?);
    Ok(RateFetcher::new(Arc::new(quotes), Arc::new(settings)))
}

async fn fetch_once(config: &AppConfig, store: &dyn Store) -> Result<()> {
    let result = build_fetcher(config, store)?.run().await;
    let report = FetchReport::from_result(&result);
    println!("{}", serde_json::to_string_pretty(&report)?);

    result?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
    }
}
