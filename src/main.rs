//! hostsync - rule driven host metadata sync
//!
//! Evaluates rule sets against host attributes and produces the outcomes
//! consumed by the Checkmk, Netbox and i-doit exporters.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use config::LogFormat;
use hostsync::{
    api, config,
    db::{self, HostRepository},
    models::Host,
    AppConfig, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    // Check for --help flag
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    // Check for --version flag
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("hostsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let import_file = match args.iter().position(|arg| arg == "--import-hosts") {
        Some(idx) => Some(
            args.get(idx + 1)
                .map(PathBuf::from)
                .context("--import-hosts requires a file argument")?,
        ),
        None => None,
    };
    let run_sync = args.iter().any(|arg| arg == "--sync");

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("hostsync starting up");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    if let Some(path) = import_file {
        return import_hosts(&db, &path).await;
    }

    let rules = config.load_rules().context("Failed to load rules")?;
    let state = AppState::init(config.clone(), db, rules)
        .await
        .context("Failed to initialize application state")?;
    info!(
        "Folder pool loaded with {} entries",
        state.pool.snapshot().len()
    );

    if run_sync {
        return sync_all(&state).await;
    }

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

/// Upsert host records from a YAML list
async fn import_hosts(db: &db::DbPool, path: &PathBuf) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file: {:?}", path))?;
    let hosts: Vec<Host> = serde_norway::from_str(&contents)
        .with_context(|| format!("Failed to parse hosts file: {:?}", path))?;

    let repo = HostRepository::new(db.clone());
    let mut created = 0;
    let mut updated = 0;

    for incoming in hosts {
        if !hostsync::utils::validation::validate_hostname(&incoming.hostname) {
            warn!("Skipping invalid hostname {:?}", incoming.hostname);
            continue;
        }
        match repo.get(&incoming.hostname).await? {
            Some(mut existing) => {
                existing.update_labels(incoming.labels);
                existing.update_inventory(incoming.inventory);
                if repo.save(&mut existing).await? {
                    updated += 1;
                }
            }
            None => {
                repo.upsert(&incoming).await?;
                created += 1;
            }
        }
    }

    info!("Imported hosts: {} created, {} updated", created, updated);
    println!("{} created, {} updated", created, updated);
    Ok(())
}

/// Evaluate every host, print the outcomes and persist state
async fn sync_all(state: &AppState) -> Result<()> {
    let host_repo = HostRepository::new(state.db.clone());
    let hosts = host_repo.get_all().await?;

    let mut report = state.sync.evaluate_hosts(hosts).await?;

    let saved = host_repo
        .save_with_seats(&mut report.hosts, &state.pool.snapshot())
        .await
        .context("Failed to persist hosts and pool seats")?;
    info!("Persisted {} changed hosts and pool seat counters", saved);

    let output = serde_json::json!({
        "hosts": report.evaluations,
        "failed": report.failed,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if !report.failed.is_empty() {
        warn!("{} hosts were flagged during sync", report.failed.len());
    }
    Ok(())
}

fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_both_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let rotation = if log_config.daily_rotation {
        tracing_appender::rolling::Rotation::DAILY
    } else {
        tracing_appender::rolling::Rotation::NEVER
    };
    let mut builder = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&log_config.log_prefix)
        .filename_suffix("log");
    if log_config.max_log_files > 0 {
        builder = builder.max_log_files(log_config.max_log_files);
    }

    match builder.build(&log_config.log_dir) {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(e) => {
            eprintln!("Warning: Failed to open log file, logging to stderr: {}", e);
            tracing_appender::non_blocking(std::io::stderr())
        }
    }
}

/// Initialize console-only logging
fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

/// Initialize file-only logging
fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(writer),
                )
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Initialize both console and file logging
fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr)) // Console
                .with(fmt::layer().json().with_target(true).with_writer(writer)) // File
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr)) // Console
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(writer),
                ) // File
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr)) // Console
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                ) // File
                .init();
        }
    }
}

/// Ensure the data directory exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// Create the application router with request tracing
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    api::create_router(state).layer(trace_layer).layer(cors)
}

/// Print help message
fn print_help() {
    println!(
        r#"hostsync {}

USAGE:
    hostsync [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --import-hosts <FILE>   Create or update host records from a YAML list
                            of {{hostname, labels, inventory}} entries
    --sync                  Evaluate every host, print the outcomes as JSON
                            and persist changed hosts and pool seats

Without options the HTTP API is served.

ENVIRONMENT:
    HOSTSYNC_CONFIG         Path to configuration file (default: config.yaml)
    HOSTSYNC_RULES          Path to rules file (default: rules.yaml)
    HOSTSYNC_TEMPLATE_MODE  nullify or strict
    HOSTSYNC_WORKERS        Hosts evaluated in parallel

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by HOSTSYNC_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/hostsync/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
