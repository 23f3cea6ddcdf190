use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{LoggingSettings, Settings, StoreBackend};
use registry::StudentService;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The main entry point for the Student Information System.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let overrides = cli.command.overrides();
    let settings = configuration::load_settings_from(&cli.config, &overrides)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(_) => web_server::run_server(&settings).await,
        Commands::Migrate => handle_migrate(&settings).await,
        Commands::List => handle_list(&settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small student information system: a REST API over student records.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file. A missing file is not an error.
    #[arg(long, global = true, default_value = configuration::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Apply pending PostgreSQL migrations and exit.
    Migrate,
    /// Print every student record as a table.
    List,
}

#[derive(Parser)]
struct ServeArgs {
    /// The interface to bind (overrides `server.host`).
    #[arg(long)]
    host: Option<String>,

    /// The port to listen on (overrides `server.port`).
    #[arg(long)]
    port: Option<u16>,

    /// The record store to use (overrides `database.backend`).
    #[arg(long, value_enum)]
    backend: Option<StoreBackend>,
}

impl Commands {
    /// Settings overrides implied by the command-line flags.
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Commands::Serve(args) = self {
            if let Some(host) = &args.host {
                overrides.push(("server.host", host.clone()));
            }
            if let Some(port) = args.port {
                overrides.push(("server.port", port.to_string()));
            }
            if let Some(backend) = args.backend {
                let name = match backend {
                    StoreBackend::Postgres => "postgres",
                    StoreBackend::Memory => "memory",
                };
                overrides.push(("database.backend", name.to_string()));
            }
        }
        overrides
    }
}

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// when `logging.directory` is set. `RUST_LOG` takes precedence over the
/// configured filter.
fn init_tracing(logging: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .with_context(|| format!("Invalid log filter '{}'", logging.filter))?;

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

// ==============================================================================
// Command Handlers
// ==============================================================================

/// Handles the `migrate` command.
async fn handle_migrate(settings: &Settings) -> anyhow::Result<()> {
    if settings.database.backend != StoreBackend::Postgres {
        bail!("Migrations only apply to the postgres backend.");
    }
    let pool = database::connect(&settings.database).await?;
    database::run_migrations(&pool).await?;
    tracing::info!("Migrations applied.");
    Ok(())
}

/// Handles the `list` command.
async fn handle_list(settings: &Settings) -> anyhow::Result<()> {
    let store = database::open_store(&settings.database).await?;
    let service = StudentService::new(store);
    let students = service.list_all().await?;

    let mut table = Table::new();
    table.set_header(vec![
        "Student ID",
        "Name",
        "Email",
        "Course",
        "Year",
        "Section",
        "Created",
    ]);
    for student in &students {
        table.add_row(vec![
            student.student_id.clone(),
            format!("{} {}", student.first_name, student.last_name),
            student.email.clone(),
            student.course.clone(),
            student.year_level.to_string(),
            student.section.clone(),
            student.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
    println!("{} student(s).", students.len());
    Ok(())
}
