use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use albumfinder_core::{
    config::RemoteConfig, load_catalog_file, load_config, metrics, resolve_rows,
    validate_config, CatalogError, CatalogSnapshot, CatalogStore, JellyfinClient, OfflineClient,
    RemoteBackend, RemoteSearchClient, SanitizedConfig, SearchController, SearchSession,
};

/// Buffer size for the query edit channel
const QUERY_BUFFER_SIZE: usize = 32;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr, stdout carries results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine config path
    let config_path = std::env::var("ALBUMFINDER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("albumfinder.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Configuration loaded successfully");

    // Load the cached catalog
    let entities = match load_catalog_file(&config.catalog.path) {
        Ok(entities) => entities,
        Err(CatalogError::NotFound(path)) => {
            warn!("Catalog cache {} not found, starting with an empty catalog", path);
            Vec::new()
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to load catalog from {:?}", config.catalog.path)
            })
        }
    };
    let catalog = CatalogStore::with_entities(entities);
    info!("Catalog initialized with {} entities", catalog.current().len());

    let client = create_client(&config.remote)?;
    info!("Using remote search backend: {}", client.name());

    let controller = SearchController::new(&config.search, catalog.clone(), client);
    let mut sessions = controller.subscribe();

    let (query_tx, query_rx) = mpsc::channel(QUERY_BUFFER_SIZE);
    let controller_handle = tokio::spawn(controller.run(query_rx));
    let input_handle = tokio::spawn(read_queries(query_tx));

    // The controller drops its session sender once stdin closes
    while sessions.changed().await.is_ok() {
        let session = sessions.borrow_and_update().clone();
        print_session(&session, &catalog.current()).context("Failed to write results")?;
    }

    controller_handle
        .await
        .context("Search controller task failed")?;
    input_handle
        .await
        .context("Input task failed")?
        .context("Failed to read queries from stdin")?;

    if config.metrics.dump_on_exit {
        print!("{}", encode_metrics()?);
    }

    info!("Shutdown complete");
    Ok(())
}

fn create_client(config: &RemoteConfig) -> Result<Arc<dyn RemoteSearchClient>> {
    match config.backend {
        RemoteBackend::Offline => {
            info!("No remote search configured, running offline");
            Ok(Arc::new(OfflineClient::new()))
        }
        RemoteBackend::Jellyfin => {
            let jellyfin = config
                .jellyfin
                .clone()
                .context("Jellyfin backend selected but no jellyfin config provided")?;
            info!("Initializing Jellyfin client at {}", jellyfin.url);
            let client = JellyfinClient::new(jellyfin).context("Failed to create Jellyfin client")?;
            Ok(Arc::new(client))
        }
    }
}

/// Forward stdin lines as query edits until EOF.
async fn read_queries(tx: mpsc::Sender<String>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if tx.send(line).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Print one JSON line per published session.
fn print_session(session: &SearchSession, snapshot: &CatalogSnapshot) -> Result<()> {
    let rows = resolve_rows(&session.results(), snapshot);
    let line = serde_json::json!({
        "query": session.query,
        "seq": session.seq,
        "phase": session.phase,
        "loading": session.loading,
        "no_results": session.shows_no_results(),
        "catalog_version": snapshot.version(),
        "catalog_published_at": snapshot.published_at().to_rfc3339(),
        "rows": rows,
    });

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

/// Encode all engine metrics in the Prometheus text format.
fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for metric in metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metric")?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}
