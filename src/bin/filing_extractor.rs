use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use filing_extractor::app::App;
use filing_extractor::archive::FolderArchive;
use filing_extractor::config::{ConfigLoader, ResolvedConfig};
use filing_extractor::domain::OrganizationKey;
use filing_extractor::error::{ErrorKind, ExtractorError};
use filing_extractor::output::JsonOutput;
use filing_extractor::registry::RegistryHttpClient;
use filing_extractor::store::SqliteStore;

#[derive(Parser)]
#[command(name = "filing-extractor")]
#[command(about = "Fetch new 10-K/10-Q filings of tracked organizations and archive their primary documents")]
#[command(version, author)]
struct Cli {
    /// Path to the JSON config (defaults to ./filing-extractor.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run one sync pass over all tracked organizations")]
    Sync,
    #[command(about = "Track organizations by registry key")]
    Track { keys: Vec<String> },
    #[command(about = "Show stored filings per organization")]
    Status,
}

type ExtractorApp = App<RegistryHttpClient, SqliteStore, FolderArchive>;

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ExtractorError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ExtractorError) -> u8 {
    match error.kind() {
        ErrorKind::Config | ErrorKind::NotFound => 2,
        ErrorKind::Fetch | ErrorKind::Decode => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let app = build_app(&config)?;

    match cli.command {
        Commands::Sync => {
            for key in &config.organizations {
                app.track(key)?;
            }
            let report = app.sync()?;
            JsonOutput::print_sync(&report).into_diagnostic()?;
            print_sync_summary(&report);
            Ok(())
        }
        Commands::Track { keys } => {
            if keys.is_empty() {
                return Err(miette::Report::msg(
                    "at least one organization key is required",
                ));
            }
            let keys = keys
                .iter()
                .map(|value| value.parse::<OrganizationKey>())
                .collect::<Result<Vec<_>, _>>()?;
            let tracked = keys
                .iter()
                .map(|key| app.track(key))
                .collect::<Result<Vec<_>, _>>()?;
            JsonOutput::print_tracked(&tracked).into_diagnostic()?;
            Ok(())
        }
        Commands::Status => {
            let report = app.status()?;
            JsonOutput::print_status(&report).into_diagnostic()?;
            Ok(())
        }
    }
}

fn build_app(config: &ResolvedConfig) -> Result<ExtractorApp, ExtractorError> {
    let registry = RegistryHttpClient::new(&config.registry, &config.user_agent)?;
    let store = SqliteStore::open(&config.database)?;
    let archive = FolderArchive::new(config.archive_root.clone());
    Ok(App::new(registry, store, archive, config.archive_layout))
}

fn print_sync_summary(report: &filing_extractor::app::SyncReport) {
    eprintln!(
        "Sync finished: {} ingested, {} metadata only, {} skipped, {} organizations failed",
        report.ingested(),
        report.metadata_only(),
        report.skipped(),
        report.failed_organizations()
    );
}
