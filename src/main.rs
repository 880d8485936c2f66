use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use contact_guard::clock::{Clock, SystemClock};
use contact_guard::config::Args;
use contact_guard::logging;
use contact_guard::models::RelayJob;
use contact_guard::registry::{GuardRegistry, sweeper};
use contact_guard::relay::{RelayTarget, relay_worker};
use contact_guard::state::AppState;
use contact_guard::storage::{FileStore, KeyValueStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();
    logging::init();

    let store: Arc<dyn KeyValueStore> = match &args.store_path {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let guard_config = args.guard_config();
    let registry = Arc::new(GuardRegistry::new(guard_config, store, clock.clone()));

    let (relay_tx, relay_rx) = mpsc::channel::<RelayJob>(100);

    // spawn the background workers
    let target = RelayTarget::new(args.relay_url.clone(), args.form_name.clone());
    tokio::spawn(relay_worker(relay_rx, reqwest::Client::new(), target));
    tokio::spawn(sweeper(registry.clone(), Duration::from_secs(args.sweep_interval)));

    let state = Arc::new(AppState {
        registry,
        clock,
        relay_tx,
        trust_forwarded: args.trust_forwarded,
    });
    let app = contact_guard::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "contact guard listening");
    tracing::info!(
        max_attempts = guard_config.rate.max_attempts,
        window_secs = guard_config.rate.window.as_secs(),
        cooldown_secs = guard_config.rate.cooldown.as_secs(),
        min_fill_ms = guard_config.min_fill_time.as_millis() as u64,
        honeypot = guard_config.honeypot,
        trust_forwarded = args.trust_forwarded,
        store = %args.store_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "memory".into()),
        "guard configured"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
