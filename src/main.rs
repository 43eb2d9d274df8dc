//! geoquery CLI Entry Point
//!
//! Subcommands:
//! - `report` - run the fixed geography query sequence (default)
//! - `seed` - insert the sample dataset
//! - `connect` - check the server answers, optionally save the settings
//!
//! Report output goes to stdout. Logs go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, warn};

use geoquery::config::{redact_uri, save_settings};
use geoquery::logging::{init_tracing, TracingConfig};
use geoquery::{
    render_text, resolve_settings, run_report, ConfigLocation, EngineKind, ErrorEnvelope,
    GeoError, GeographyEngine, MemoryEngine, Metadata, OutputFormat, Report, Result, SeedData,
    SeedSummary, ServerInfo, Settings, SettingsLayer, SuccessEnvelope,
};

/// geoquery - geography queries over a MongoDB document store
#[derive(Parser)]
#[command(name = "geoquery")]
#[command(about = "Run a fixed set of geography queries against a MongoDB database")]
#[command(version)]
struct Cli {
    /// Storage engine
    #[arg(long, value_enum, default_value_t = EngineArg::Mongodb, global = true)]
    engine: EngineArg,

    /// MongoDB connection string (overrides GEOQUERY_URI and config files)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Database name (overrides GEOQUERY_DATABASE and config files)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::Text, global = true)]
    format: FormatArg,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Run the geography report
    Report {
        /// Insert the sample dataset before querying
        #[arg(long)]
        seed: bool,

        /// Drop the collections before seeding
        #[arg(long, requires = "seed")]
        drop: bool,
    },

    /// Insert the sample dataset
    Seed {
        /// Drop the collections first
        #[arg(long)]
        drop: bool,
    },

    /// Check the connection and report the server version
    Connect {
        /// Save the effective settings after a successful connection
        #[arg(long, value_enum)]
        save: Option<SaveLocation>,

        /// Prompt for the connection string and database name
        #[arg(long)]
        interactive: bool,
    },
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Report { .. } => "report",
            Self::Seed { .. } => "seed",
            Self::Connect { .. } => "connect",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum EngineArg {
    Mongodb,
    Memory,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Mongodb => Self::MongoDb,
            EngineArg::Memory => Self::Memory,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SaveLocation {
    Local,
    Global,
}

impl From<SaveLocation> for ConfigLocation {
    fn from(arg: SaveLocation) -> Self {
        match arg {
            SaveLocation::Local => Self::Local,
            SaveLocation::Global => Self::Global,
        }
    }
}

/// Result of one command, rendered by `print_outcome`
enum Outcome {
    Report(Report),
    Seeded(SeedSummary),
    Connected { info: ServerInfo, saved_to: Option<std::path::PathBuf> },
}

#[derive(Serialize)]
struct ConnectData<'a> {
    #[serde(flatten)]
    info: &'a ServerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

fn prompt_settings(mut settings: Settings) -> Result<Settings> {
    let prompt_err = |e: dialoguer::Error| GeoError::invalid_input(format!("Prompt failed: {e}"));

    settings.uri = dialoguer::Input::<String>::new()
        .with_prompt("MongoDB connection string")
        .default(settings.uri.clone())
        .interact_text()
        .map_err(prompt_err)?;

    settings.database = dialoguer::Input::<String>::new()
        .with_prompt("Database name")
        .default(settings.database.clone())
        .interact_text()
        .map_err(prompt_err)?;

    Ok(settings)
}

async fn execute<E: GeographyEngine>(
    engine: &E,
    command: &Commands,
    settings: &Settings,
) -> Result<Outcome> {
    match command {
        Commands::Report { seed, drop } => {
            // Nothing persists in memory, so the memory engine always starts from the sample
            if *seed || engine.kind() == EngineKind::Memory {
                let summary = engine.seed(&SeedData::sample()?, *drop).await?;
                debug!(documents = summary.total(), "seeded before report");
            }
            Ok(Outcome::Report(run_report(engine).await?))
        }
        Commands::Seed { drop } => {
            let summary = engine.seed(&SeedData::sample()?, *drop).await?;
            if engine.kind() == EngineKind::Memory {
                warn!("memory engine does not persist seeded data");
            }
            Ok(Outcome::Seeded(summary))
        }
        Commands::Connect { save, .. } => {
            let info = engine.ping().await?;
            let saved_to = match save {
                Some(location) => Some(save_settings(settings, (*location).into())?),
                None => None,
            };
            Ok(Outcome::Connected { info, saved_to })
        }
    }
}

async fn dispatch(cli: &Cli, command: &Commands) -> Result<Outcome> {
    let flags = SettingsLayer { uri: cli.uri.clone(), database: cli.database.clone(), collections: None };
    let mut settings = resolve_settings(flags)?;

    if let Commands::Connect { interactive: true, .. } = command {
        settings = prompt_settings(settings)?;
    }

    debug!(uri = %redact_uri(&settings.uri), database = %settings.database, "resolved settings");

    match EngineKind::from(cli.engine) {
        EngineKind::Memory => {
            let engine = MemoryEngine::new(settings.database.clone());
            execute(&engine, command, &settings).await
        }
        #[cfg(feature = "mongodb")]
        EngineKind::MongoDb => {
            let engine = geoquery::MongoEngine::connect(&settings).await?;
            execute(&engine, command, &settings).await
        }
        #[cfg(not(feature = "mongodb"))]
        EngineKind::MongoDb => Err(GeoError::invalid_input(
            "This build has no MongoDB support; use --engine memory",
        )),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: could not serialize output: {e}"),
    }
}

fn print_outcome(outcome: &Outcome, format: OutputFormat, engine: &str, command: &str, elapsed_ms: u64) {
    match (outcome, format) {
        (Outcome::Report(report), OutputFormat::Text) => print!("{}", render_text(report)),
        (Outcome::Report(report), OutputFormat::Json) => print_json(&SuccessEnvelope::new(
            engine,
            command,
            report,
            Metadata::with_sections(elapsed_ms, report.sections.len()),
        )),
        (Outcome::Seeded(summary), OutputFormat::Text) => println!(
            "Seeded {} continents, {} countries, {} cities",
            summary.continents, summary.countries, summary.cities
        ),
        (Outcome::Seeded(summary), OutputFormat::Json) => {
            print_json(&SuccessEnvelope::new(engine, command, summary, Metadata::new(elapsed_ms)));
        }
        (Outcome::Connected { info, saved_to }, OutputFormat::Text) => {
            println!(
                "Connected to {} {} (database {})",
                info.engine, info.server_version, info.database
            );
            if let Some(path) = saved_to {
                println!("Settings saved to {}", path.display());
            }
        }
        (Outcome::Connected { info, saved_to }, OutputFormat::Json) => {
            let data = ConnectData { info, saved_to: saved_to.as_ref().map(|p| p.display().to_string()) };
            print_json(&SuccessEnvelope::new(engine, command, data, Metadata::new(elapsed_ms)));
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig { verbose: cli.verbose }) {
        eprintln!("warning: could not initialize logging: {e}");
    }

    let command = cli.command.clone().unwrap_or(Commands::Report { seed: false, drop: false });
    let engine = EngineKind::from(cli.engine).to_string();
    let format = OutputFormat::from(cli.format);

    let start = Instant::now();
    let result = dispatch(&cli, &command).await;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(outcome) => {
            print_outcome(&outcome, format, &engine, command.name(), elapsed_ms);
            ExitCode::SUCCESS
        }
        Err(err) => {
            match format {
                OutputFormat::Json => print_json(&ErrorEnvelope::from_error(&engine, command.name(), &err)),
                OutputFormat::Text => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}
