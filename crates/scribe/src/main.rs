//! scribe server binary.
//!
//! Startup order matters: settings → store + migrations → recovery
//! reconciler → engine factory → HTTP server. Recovery runs to completion
//! before the listener binds, so no caller can ever observe a job that a
//! dead worker still appears to own.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scribe_engine::{ExecutorConfig, JobExecutor, recover_interrupted};
use scribe_server::{AppState, router, serve};
use scribe_settings::{ScribeSettings, load_settings_from_path, settings_path};
use scribe_store::{ArtifactStore, JobStore};
use scribe_transcribe::EngineFactory;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Self-hosted audio transcription job server.
#[derive(Debug, Parser)]
#[command(name = "scribe", version, about)]
struct Cli {
    /// Settings file (default: ~/.scribe/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let settings = load_cli_settings(&cli)?;
    scribe_settings::init_settings(settings.clone());
    let settings = Arc::new(settings);

    std::fs::create_dir_all(&settings.storage.data_dir)
        .with_context(|| format!("create data dir {}", settings.storage.data_dir))?;

    let metrics = scribe_server::metrics::install_recorder();

    let store = Arc::new(
        JobStore::open(&settings.storage.db_path()).context("open job store")?,
    );

    // Recovery must finish before the submission boundary opens.
    let recovered = recover_interrupted(&store).context("startup recovery")?;
    if recovered > 0 {
        info!(recovered, "startup recovery repaired interrupted jobs");
    }

    let artifacts = Arc::new(
        ArtifactStore::new(
            settings.storage.audio_dir(),
            settings.storage.transcript_dir(),
        )
        .context("open artifact store")?,
    );

    let executor = Arc::new(JobExecutor::new(
        Arc::clone(&store),
        Arc::clone(&artifacts),
        engine_factory(&settings),
        ExecutorConfig {
            progress_every_segments: settings.transcription.progress_every_segments,
            ..ExecutorConfig::default()
        },
    ));

    let state = AppState::new(
        store,
        artifacts,
        Arc::clone(&executor),
        settings.transcription.default_model.clone(),
        metrics,
    );

    let max_upload_bytes = usize::try_from(settings.server.max_upload_mb)
        .unwrap_or(usize::MAX)
        .saturating_mul(1024 * 1024);
    let app = router(state, max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("parse listen address")?;

    serve(app, addr, shutdown_signal()).await.context("serve")?;

    // Give in-flight attempts a bounded window; anything still running gets
    // picked up by the reconciler on the next start.
    if tokio::time::timeout(Duration::from_secs(10), executor.shutdown())
        .await
        .is_err()
    {
        warn!(
            in_flight = executor.in_flight(),
            "shutdown timed out waiting for workers; jobs will be recovered on restart"
        );
    }
    info!("bye");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_cli_settings(cli: &Cli) -> anyhow::Result<ScribeSettings> {
    let path = cli.config.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path)
        .with_context(|| format!("load settings from {}", path.display()))?;
    if let Some(ref dir) = cli.data_dir {
        settings.storage.data_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    Ok(settings)
}

#[cfg(feature = "whisper")]
fn engine_factory(settings: &ScribeSettings) -> Arc<dyn EngineFactory> {
    info!(
        models_dir = %settings.transcription.models_dir,
        gpu = settings.transcription.gpu,
        "using whisper.cpp engine"
    );
    Arc::new(scribe_transcribe::WhisperEngineFactory::new(
        settings.transcription.models_dir.clone(),
        settings.transcription.gpu,
    ))
}

#[cfg(not(feature = "whisper"))]
fn engine_factory(_settings: &ScribeSettings) -> Arc<dyn EngineFactory> {
    warn!("no speech engine compiled in; jobs will fail until rebuilt with --features whisper");
    Arc::new(scribe_transcribe::DisabledEngineFactory)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
