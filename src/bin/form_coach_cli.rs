use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use form_coach::config::{AppConfig, DetectionMode};
use form_coach::fixtures::synthetic::builtin_specs;
use form_coach::fixtures::{
    ExpectationDiff, FixtureCatalog, PoseTrace, ReplaySummary, TraceProcessor,
};
use form_coach::profile::{all_profiles, profile_for, ExerciseType};
use form_coach::telemetry::{self, DiagnosticError};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "form_coach_cli",
    about = "Deterministic pose-trace harness for the form coach analysis core"
)]
struct Cli {
    /// Override directory containing trace assets (defaults to ./fixtures)
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log analyzer state changes to stderr
    #[arg(long, short)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace and optionally compare against expectations
    Replay {
        #[arg(long)]
        trace: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Print every frame result as one JSON line instead of the summary
        #[arg(long)]
        frames: bool,
    },
    /// Build and replay one of the built-in synthetic scenarios
    Synthetic {
        #[arg(long)]
        scenario: String,
        #[arg(long, default_value_t = 0.0)]
        jitter: f32,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Also write the generated trace to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
    /// Print exercise profiles as JSON
    Profiles {
        #[arg(long)]
        exercise: Option<String>,
    },
    /// List available traces on disk and built-in scenarios
    DumpFixtures,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    RuleBased,
    Scientific,
}

impl From<ModeArg> for DetectionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::RuleBased => DetectionMode::RuleBased,
            ModeArg::Scientific => DetectionMode::Scientific,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };
    if let Err(err) = config.validate() {
        telemetry::hub().record_error(DiagnosticError::InvalidConfig, err.to_string());
        return Err(anyhow!(err).context("validating configuration"));
    }

    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_else(FixtureCatalog::default);

    match cli.command {
        Commands::Replay {
            trace,
            expect,
            output,
            mode,
            frames,
        } => run_replay(&catalog, config, &trace, expect, output, mode, frames),
        Commands::Synthetic {
            scenario,
            jitter,
            seed,
            mode,
            write,
        } => run_synthetic(config, &scenario, jitter, seed, mode, write),
        Commands::Profiles { exercise } => run_profiles(exercise.as_deref()),
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_replay(
    catalog: &FixtureCatalog,
    config: AppConfig,
    trace: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
    mode: Option<ModeArg>,
    frames: bool,
) -> Result<ExitCode> {
    let (metadata, mut pose_trace) = catalog.load(trace, override_expect).map_err(|err| {
        telemetry::hub().record_error(DiagnosticError::FixtureLoad, err.to_string());
        anyhow!(err)
    })?;
    if let Some(mode) = mode {
        pose_trace.mode = Some(mode.into());
    }

    let replay = TraceProcessor::new(config)
        .run(&pose_trace)
        .with_context(|| format!("replaying trace {}", metadata.name))?;

    if frames {
        for result in &replay.results {
            println!("{}", serde_json::to_string(result)?);
        }
    } else {
        emit_report(&replay.summary, output_path)?;
    }

    verify(&pose_trace, &replay.summary)
}

fn run_synthetic(
    config: AppConfig,
    scenario: &str,
    jitter: f32,
    seed: u64,
    mode: Option<ModeArg>,
    write: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut spec = builtin_specs()
        .into_iter()
        .find(|spec| spec.id == scenario)
        .ok_or_else(|| anyhow!("Unknown synthetic scenario '{scenario}'"))?
        .with_jitter(jitter, seed);
    spec.mode = mode.map(Into::into);

    let pose_trace = spec.build();
    if let Some(path) = write {
        let json = serde_json::to_string_pretty(&pose_trace)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let replay = TraceProcessor::new(config)
        .run(&pose_trace)
        .with_context(|| format!("replaying scenario {scenario}"))?;
    emit_report(&replay.summary, None)?;

    verify(&pose_trace, &replay.summary)
}

fn run_profiles(exercise: Option<&str>) -> Result<ExitCode> {
    let json = match exercise {
        Some(name) => {
            let exercise: ExerciseType = name.parse()?;
            serde_json::to_string_pretty(profile_for(exercise)?)?
        }
        None => serde_json::to_string_pretty(all_profiles())?,
    };
    println!("{json}");
    Ok(ExitCode::from(0))
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let traces = catalog.discover()?;
    if traces.is_empty() {
        println!("No traces found under {}", catalog.root().display());
    }

    for metadata in traces {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    for spec in builtin_specs() {
        println!("synthetic:{}", spec.id);
    }
    Ok(ExitCode::from(0))
}

fn verify(trace: &PoseTrace, summary: &ReplaySummary) -> Result<ExitCode> {
    match &trace.expectations {
        Some(expectations) => match expectations.verify(summary) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        },
        None => Ok(ExitCode::from(0)),
    }
}

fn emit_report(summary: &ReplaySummary, output_path: Option<PathBuf>) -> Result<()> {
    let report = ReplayReportPayload {
        summary,
        telemetry: telemetry::hub().snapshot().total_events,
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct ReplayReportPayload<'a> {
    #[serde(flatten)]
    summary: &'a ReplaySummary,
    /// Events published to the process-wide telemetry hub
    telemetry: u64,
}
