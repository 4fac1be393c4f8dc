use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use todoql_cli::{CliError, Command, OutputFormat};
use todoql_db::Database;

/// Environment variable name for the database path
const TODOQL_DB_PATH_ENV: &str = "TODOQL_DB_PATH";

/// todoql - query, page through and summarize todos
#[derive(Parser)]
#[command(name = "todoql")]
#[command(version)]
#[command(about = "Query, page through and summarize todos", long_about = None)]
struct Args {
    /// Path to the database directory (can also be set via TODOQL_DB_PATH env var)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Get the database path from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --db argument
/// 2. TODOQL_DB_PATH environment variable (if non-empty)
/// 3. Default path (<local data dir>/todoql/data)
fn resolve_db_path(cli_db: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_db {
        return path;
    }

    if let Ok(env_path) = std::env::var(TODOQL_DB_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    Database::default_path()
}

/// Initialize logging from RUST_LOG, defaulting to warn
///
/// Examples:
/// - `RUST_LOG=trace` - show all trace logs
/// - `RUST_LOG=todoql_db=debug` - show store queries and repository operations
/// - `RUST_LOG=error` - show error only
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> Result<(), CliError> {
    let args = Args::parse();
    let output = run_with_args(&args).await?;
    println!("{}", output);
    Ok(())
}

/// Run the application with the given arguments and return what to print
async fn run_with_args(args: &Args) -> Result<String, CliError> {
    let db_path = resolve_db_path(args.db.clone());
    tracing::debug!("Using database at {}", db_path.display());

    let db = Database::connect(&db_path).await?;
    db.init().await?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &args.command {
        Some(cmd) => cmd.execute(&db.store(), format).await,
        None => Ok("Welcome to todoql!\nUse 'todoql --help' for usage information.".to_string()),
    }
}
