//! cloudinfod: cloud product information daemon.
//!
//! Keeps an in-memory catalogue of every configured provider refreshed on
//! schedule until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cloudinfo::server::config::Config;
use cloudinfo::{
    BroadcastEventBus, CloudInfo, CloudInfoStore, InMemoryStore, ScrapingDriver, SnapshotInfoer,
    StaticDataLoader, StaticSource,
};

/// Cloud product information service.
#[derive(Parser)]
#[command(name = "cloudinfod")]
#[command(version)]
#[command(about = "Cloud instance type, price and image catalogue daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "CLOUDINFO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let store: Arc<dyn CloudInfoStore> = Arc::new(InMemoryStore::new(&config.store_config()));
    let events = Arc::new(BroadcastEventBus::new());
    let driver = build_driver(&config, Arc::clone(&store), Arc::clone(&events))?;

    let info = CloudInfo::new(config.providers.keys().cloned(), Arc::clone(&store));
    let mut completed = events.subscribe();
    tokio::spawn(async move {
        while let Some(event) = completed.next().await {
            match info.get_status(&event.provider) {
                Ok(status) => info!(topic = %event.topic(), %status, "provider refreshed"),
                Err(e) => warn!(topic = %event.topic(), error = %e, "provider refreshed without status"),
            }
        }
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        providers = driver.providers().len(),
        "cloudinfod starting"
    );

    let cancel = CancellationToken::new();
    let mut handles = driver.start(cancel.clone())?;
    handles.push(StaticDataLoader::new(Arc::clone(&store)).schedule(
        static_sources(&config),
        config.scrape_config().renewal_interval,
        cancel.clone(),
    )?);

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    cancel.cancel();
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

/// Build a [`ScrapingDriver`] with one snapshot provider per configured provider.
fn build_driver(
    config: &Config,
    store: Arc<dyn CloudInfoStore>,
    events: Arc<BroadcastEventBus>,
) -> cloudinfo::Result<ScrapingDriver> {
    let mut builder = ScrapingDriver::builder()
        .store(store)
        .event_bus(events)
        .config(config.scrape_config());

    for (name, provider) in &config.providers {
        let Some(snapshot) = &provider.snapshot else {
            continue;
        };
        builder = builder.provider(
            provider.descriptor(name),
            Arc::new(SnapshotInfoer::new(snapshot)),
        );
    }

    builder.build()
}

/// Data files of every configured static service.
fn static_sources(config: &Config) -> Vec<StaticSource> {
    config
        .providers
        .iter()
        .flat_map(|(name, provider)| {
            provider
                .static_services()
                .map(move |(service, path)| StaticSource::new(name.as_str(), service, path))
        })
        .collect()
}
