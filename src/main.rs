use anyhow::Result;
use clap::{CommandFactory as _, Parser, Subcommand};
use std::sync::Arc;
use taskd::{cli, config::Config, rest, storage::Storage, AppContext};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — task-tracking HTTP service and CLI client",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory for the SQLite database and config
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Base URL of the server, for client subcommands
    #[arg(long, env = "TASKD_URL", global = true)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server.
    ///
    /// Runs taskd in the foreground, serving the task API until interrupted.
    ///
    /// Examples:
    ///   taskd serve
    ///   taskd --port 8080 --bind-address 0.0.0.0 serve
    Serve,
    /// Create a task.
    ///
    /// Sends POST /tasks to a running server and prints the created task.
    ///
    /// Examples:
    ///   taskd create --title "write report"
    ///   taskd create --title "ship v2" --description "tag and publish" --status doing
    Create {
        /// Task title (required, must be non-empty)
        #[arg(long)]
        title: String,
        /// Optional free-form description
        #[arg(long, default_value = "")]
        description: String,
        /// Initial status
        #[arg(long, default_value = "pendente")]
        status: String,
    },
    /// List all tasks.
    ///
    /// Examples:
    ///   taskd list
    List,
    /// Show one task by id.
    ///
    /// Examples:
    ///   taskd get 3
    Get { id: i64 },
    /// Update fields of a task. Only the flags you pass are changed.
    ///
    /// Examples:
    ///   taskd update 3 --status done
    ///   taskd update 3 --title "new title" --description "more detail"
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a task by id.
    ///
    /// Examples:
    ///   taskd delete 3
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ── Logging setup ────────────────────────────────────────────────────────
    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format = std::env::var("TASKD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);

    let command = match args.command {
        Some(command) => command,
        None => {
            Args::command().print_help()?;
            std::process::exit(1);
        }
    };

    match command {
        Command::Serve => {
            let config = Arc::new(Config::new(
                args.port,
                args.data_dir,
                args.log,
                args.bind_address,
            ));
            let storage = Arc::new(Storage::new(&config.data_dir, config.max_connections).await?);
            info!(path = %config.data_dir.display(), "storage initialized");
            let ctx = Arc::new(AppContext { config, storage });
            rest::start_rest_server(ctx).await?;
        }
        Command::Create {
            title,
            description,
            status,
        } => {
            let base_url = client_base_url(args.url, args.data_dir);
            cli::run_create(&base_url, title, description, status).await?;
        }
        Command::List => {
            let base_url = client_base_url(args.url, args.data_dir);
            cli::run_list(&base_url).await?;
        }
        Command::Get { id } => {
            let base_url = client_base_url(args.url, args.data_dir);
            cli::run_get(&base_url, id).await?;
        }
        Command::Update {
            id,
            title,
            description,
            status,
        } => {
            let base_url = client_base_url(args.url, args.data_dir);
            cli::run_update(&base_url, id, title, description, status).await?;
        }
        Command::Delete { id } => {
            let base_url = client_base_url(args.url, args.data_dir);
            cli::run_delete(&base_url, id).await?;
        }
    }

    Ok(())
}

/// Resolve the base URL for client subcommands: `--url` / `TASKD_URL` wins,
/// then `api_url` from config.toml, then the built-in default.
fn client_base_url(url: Option<String>, data_dir: Option<std::path::PathBuf>) -> String {
    url.unwrap_or_else(|| Config::new(None, data_dir, Some("error".to_string()), None).api_url)
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
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
                "warn: could not create log directory '{}': {e} — falling back to stdout",
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
