use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use taskd::{config::Config, rest, storage, AppContext};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "taskd", about = "Minimal to-do task HTTP backend", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the TOML config file (default: ./taskd.toml)
    #[arg(long, env = "TASKD_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// HTTP listen port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Bind address (default: 0.0.0.0)
    #[arg(long, env = "TASKD_BIND")]
    bind: Option<String>,

    /// Store connection URL, e.g. sqlite://tasks.db?mode=rwc
    #[arg(long, env = "TASKD_DB_URL")]
    db_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Include store error detail in 500 response bodies (development aid)
    #[arg(long, env = "TASKD_DEBUG_ERRORS")]
    debug_errors: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default when no subcommand given).
    ///
    /// Examples:
    ///   taskd serve
    ///   taskd
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Init once, before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format = std::env::var("TASKD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);

    match args.command {
        None | Some(Command::Serve) => {
            run_server(
                args.config,
                args.port,
                args.bind,
                args.db_url,
                args.log,
                args.debug_errors,
            )
            .await?;
        }
    }

    Ok(())
}

async fn run_server(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
    db_url: Option<String>,
    log: Option<String>,
    debug_errors: bool,
) -> Result<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "taskd starting");

    let config = Arc::new(Config::new(
        config_path,
        port,
        bind,
        db_url,
        log,
        debug_errors,
    ));
    info!(port = config.port, bind = %config.bind_address, "config loaded");

    let store = connect_store(&config).await;

    let ctx = Arc::new(AppContext {
        config,
        store: store.clone(),
        started_at: std::time::Instant::now(),
    });

    rest::start_rest_server(ctx, make_shutdown_future()).await?;

    info!("shutdown signal received, closing store connection");
    store.close().await;
    Ok(())
}

/// Connect to the configured store.
///
/// A missing URL or a failed connect is not fatal: the server starts with a
/// disconnected store, every task operation answers 500, and /health reports
/// the state.
async fn connect_store(config: &Config) -> Arc<dyn storage::TaskStore> {
    let Some(db_url) = config.db_url.as_deref() else {
        error!("no store URL configured (set --db-url or TASKD_DB_URL), running disconnected");
        return Arc::new(storage::DisconnectedStore);
    };

    match storage::SqliteTaskStore::connect_with_slow_query(
        db_url,
        config.observability.slow_query_threshold_ms,
    )
    .await
    {
        Ok(store) => {
            info!(db_url = %db_url, "connected to store");
            Arc::new(store)
        }
        Err(e) => {
            error!(db_url = %db_url, err = %e, "store connection failed, running disconnected");
            Arc::new(storage::DisconnectedStore)
        }
    }
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning; never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e}, falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}

/// Resolves when a shutdown signal is received.
///
/// On Unix we listen for SIGTERM *and* Ctrl-C.
/// On other platforms we listen for Ctrl-C only.
async fn make_shutdown_future() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}
