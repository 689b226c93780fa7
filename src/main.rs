use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use flightaudit::loader::{AuditInputs, write_table};
use flightaudit::roster::{
    Roster, has_advanced_endorsement, has_instrument_rating, has_multiengine_endorsement,
};
use flightaudit::{AuditConfig, AuditEngine, logging};

#[derive(Parser)]
#[command(name = "flightaudit", version)]
#[command(about = "Audit flight-school takeoffs against weather minimums", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/flightaudit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit every lesson and write the violations report
    Audit {
        /// Directory holding the input files
        #[arg(long)]
        dir: PathBuf,
        /// Report file (default: <dir>/<audit.output>)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Concurrent audit workers
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Show the weather report and day/night in force at a time
    Weather {
        #[arg(long)]
        dir: PathBuf,
        /// Takeoff time, e.g. 2017-04-21T08:30:00-04:00
        #[arg(long)]
        at: String,
        /// Also show this student's certification and endorsements at that time
        #[arg(long)]
        student: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AuditConfig::load_from_path(cli.config.clone())?;
    logging::init_tracing(&config.logging, cli.verbose);

    match cli.command {
        Commands::Audit { dir, out, workers } => {
            if let Some(workers) = workers {
                config.audit.workers = workers;
                config.validate()?;
            }
            run_audit(&config, &dir, out).await
        }
        Commands::Weather { dir, at, student } => {
            show_weather(&config, &dir, &at, student.as_deref())
        }
    }
}

async fn run_audit(config: &AuditConfig, dir: &Path, out: Option<PathBuf>) -> Result<()> {
    let inputs = AuditInputs::load(dir, &config.files)
        .with_context(|| format!("Failed to load audit inputs from {}", dir.display()))?;
    let AuditInputs {
        lessons,
        lesson_header,
        observations,
        day_cycle,
        roster,
    } = inputs;

    let engine = AuditEngine::new(observations, day_cycle, roster)
        .with_missing_minimums(config.audit.missing_minimums);
    let report = Arc::new(engine)
        .audit_concurrent(lessons, config.audit.workers)
        .await?;

    let out = out.unwrap_or_else(|| dir.join(&config.audit.output));
    let header = (!lesson_header.is_empty()).then_some(lesson_header.as_slice());
    write_table(&report.to_rows(header), &out)
        .with_context(|| format!("Failed to write report to {}", out.display()))?;
    info!("Wrote {} violations to {}", report.entries().len(), out.display());

    println!(
        "Audited {} lessons ({} without applicable minimums)",
        report.audited(),
        report.skipped()
    );
    for (label, count) in report.summary() {
        println!("  {:<10} {count}", label.as_str());
    }
    println!("Report: {}", out.display());
    Ok(())
}

fn show_weather(
    config: &AuditConfig,
    dir: &Path,
    at: &str,
    student: Option<&str>,
) -> Result<()> {
    let inputs = AuditInputs::load(dir, &config.files)
        .with_context(|| format!("Failed to load audit inputs from {}", dir.display()))?;
    let takeoff = inputs.day_cycle.parse_instant(at)?;

    let daytime = match inputs.day_cycle.is_daytime(&takeoff) {
        Some(true) => "day",
        Some(false) => "night",
        None => "unknown (no sunrise/sunset entry)",
    };
    println!("Time:        {takeoff}");
    println!("Day/night:   {daytime}");

    match inputs.observations.locate(&takeoff) {
        Some(report) => {
            println!("Report:      {}", report.key);
            println!("Visibility:  {}", report.observation.visibility);
            println!("Wind:        {}", report.observation.wind);
            println!("Ceiling:     {}", report.observation.ceiling);
        }
        None => println!("Report:      none at or before this time"),
    }

    let Some(id) = student else {
        return Ok(());
    };
    let Some(pilot) = inputs.roster.student(id) else {
        println!("Student:     {id} is not on the roster");
        return Ok(());
    };
    let yes_no = |held: bool| if held { "yes" } else { "no" };
    println!("Student:     {} {} {}", pilot.id, pilot.first_name, pilot.last_name);
    println!(
        "Level:       {:?}",
        inputs.roster.certification(&pilot.id, &takeoff)
    );
    println!("Instrument:  {}", yes_no(has_instrument_rating(pilot, &takeoff)));
    println!("Advanced:    {}", yes_no(has_advanced_endorsement(pilot, &takeoff)));
    println!("Multiengine: {}", yes_no(has_multiengine_endorsement(pilot, &takeoff)));

    Ok(())
}
