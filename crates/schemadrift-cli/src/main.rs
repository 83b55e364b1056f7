use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemadrift_catalog::Snapshot;
use schemadrift_core::{Config, Report, Side};
use schemadrift_engine::{Comparison, Labels, MetadataNormalizer};

mod render;
mod sources;

use render::ReportRenderer;
use sources::{ConnectionArgs, SourceSpec};

/// SchemaDrift - compare the schemas of two databases
#[derive(Parser)]
#[command(name = "schemadrift")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to config file (default: schemadrift.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Without a subcommand, compare
    #[command(flatten)]
    compare: CompareArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the reference database against the compared one (default)
    Compare(CompareArgs),

    /// Save a database schema to a JSON snapshot
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct CompareArgs {
    /// Reference database name
    #[arg(short, long)]
    from: Option<String>,

    /// Compared database name
    #[arg(short, long)]
    to: Option<String>,

    /// Read the reference side from a snapshot file
    #[arg(long, conflicts_with = "from")]
    from_snapshot: Option<PathBuf>,

    /// Read the compared side from a snapshot file
    #[arg(long, conflicts_with = "to")]
    to_snapshot: Option<PathBuf>,

    /// Also write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Args, Debug, Clone, Default)]
struct SnapshotArgs {
    /// Database to capture (default: the [reference] section of the config)
    #[arg(short, long)]
    database: Option<String>,

    /// Output file (default: <label>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// How a completed comparison ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Clean,
    Drift,
}

/// Process exit status: 0 clean, 1 drift, 2 when the run could not complete
fn exit_status(result: &Result<Status>) -> u8 {
    match result {
        Ok(Status::Clean) => 0,
        Ok(Status::Drift) => 1,
        Err(_) => 2,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(cli).await;
    if let Err(e) = &result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
    }
    ExitCode::from(exit_status(&result))
}

/// Install the stderr subscriber; `RUST_LOG` overrides the verbosity flag
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<Status> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let renderer = ReportRenderer::new();
    let mut out = std::io::stdout().lock();

    match cli.command {
        Some(Commands::Compare(args)) => {
            compare_command(&config, args, cli.verbose, &renderer, &mut out).await
        }
        Some(Commands::Snapshot(args)) => {
            snapshot_command(&config, args, cli.verbose, &renderer, &mut out).await
        }
        None => compare_command(&config, cli.compare, cli.verbose, &renderer, &mut out).await,
    }
}

/// Explicit config path, else `schemadrift.toml` in the working directory, else defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let default_path = Path::new("schemadrift.toml");
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "loading config");
        return Config::from_file(default_path).context("failed to load schemadrift.toml");
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Compare command - run the comparison and print every finding to `out`
async fn compare_command(
    config: &Config,
    args: CompareArgs,
    verbose: bool,
    renderer: &ReportRenderer,
    out: &mut impl Write,
) -> Result<Status> {
    let connection = args.connection.with_env_password();

    let reference = SourceSpec::resolve(
        Side::Reference,
        args.from.as_deref(),
        args.from_snapshot.as_deref(),
        &connection,
        config,
    )?;
    let compared = SourceSpec::resolve(
        Side::Compared,
        args.to.as_deref(),
        args.to_snapshot.as_deref(),
        &connection,
        config,
    )?;

    let (reference_source, reference_label) = reference.open(&connection).await?;
    let (compared_source, compared_label) = compared.open(&connection).await?;

    if verbose {
        eprintln!(
            "{} {} ({}) against {} ({})",
            "Comparing".cyan(),
            compared_label,
            compared_source.name(),
            reference_label,
            reference_source.name()
        );
    }

    let outcome = Comparison::new(
        reference_source.as_ref(),
        compared_source.as_ref(),
        Labels::new(&reference_label, &compared_label),
    )
    .with_normalizer(MetadataNormalizer::from_rules(&config.ignore))
    .with_filter(config.filter.clone())
    .run()
    .await
    .context("comparison aborted")?;

    let report = Report::from_findings(reference_label, compared_label, outcome.findings)
        .with_tables_compared(outcome.tables_compared);

    renderer.render(out, &report)?;

    if let Some(path) = &args.json {
        report
            .save_to_file(path)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    if verbose {
        renderer.render_summary(&mut std::io::stderr().lock(), &report)?;
    }

    Ok(if report.has_drift() {
        Status::Drift
    } else {
        Status::Clean
    })
}

/// Snapshot command - capture one database to a JSON file
async fn snapshot_command(
    config: &Config,
    args: SnapshotArgs,
    verbose: bool,
    renderer: &ReportRenderer,
    out: &mut impl Write,
) -> Result<Status> {
    let connection = args.connection.with_env_password();
    let spec = SourceSpec::resolve(
        Side::Reference,
        args.database.as_deref(),
        None,
        &connection,
        config,
    )?;

    let (source, label) = spec.open(&connection).await?;

    if verbose {
        eprintln!("{} {}...", "Capturing".cyan(), label);
    }

    let snapshot = Snapshot::capture(source.as_ref())
        .await
        .with_context(|| format!("failed to capture {}", label))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", label)));
    snapshot
        .save_to_file(&output)
        .with_context(|| format!("failed to write snapshot to {}", output.display()))?;

    writeln!(
        out,
        "{} {} tables from {} to {}",
        renderer.saved(),
        snapshot.tables.len(),
        label,
        output.display()
    )?;

    Ok(Status::Clean)
}
