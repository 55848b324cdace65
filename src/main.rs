use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leafmedic::classifier::roboflow::RoboflowClassifier;
use leafmedic::config::{Config, DiseaseDb};
use leafmedic::consts::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_DISEASE_DB, DEFAULT_MAX_UPLOAD_MB, DEFAULT_MODEL_ID,
};
use leafmedic::recommend::Recommender;
use leafmedic::server::{AppState, router};

#[derive(Parser)]
#[command(
    name = "leafmedic",
    version,
    about = "Plant disease diagnosis from leaf photos."
)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Optional JSON disease database (label -> treatment/prevention)
    #[arg(short, long, default_value = DEFAULT_DISEASE_DB)]
    disease_db: PathBuf,

    /// Classifier API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Classification model identifier
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Classifier API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Classifier request timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// Maximum upload size in megabytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,leafmedic=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_base: cli.api_base,
        model_id: cli.model_id,
        timeout: Duration::from_secs(cli.timeout),
        max_upload_bytes: cli.max_upload_mb * 1024 * 1024,
        ..Config::default()
    }
    .with_api_key(cli.api_key);

    if config.api_key.is_none() {
        warn!("{} is not set; /analyze will report a missing key", API_KEY_ENV);
    }

    let db = Arc::new(DiseaseDb::load(&cli.disease_db));
    let classifier =
        RoboflowClassifier::new(&config).context("failed to build classifier client")?;
    let state = AppState::new(Arc::new(classifier), Recommender::new(db));
    let app = router(state, config.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", cli.host, cli.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, endpoint = %config.endpoint(), "leafmedic listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
