//! TalkOne iOS CLI
//!
//! Builds the Flutter iOS app into an IPA and publishes it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize, Stream};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use talkone_cli::output::{self, format_duration, format_size_exact, Status};
use talkone_cli::progress;
use talkone_core::config::{Config, FailurePolicy, PipelineConfig};
use talkone_core::error::{exit_codes, Error};
use talkone_core::pipeline::{DryRunExecutor, PipelineObserver, Stage, StageOutcome, SystemExecutor};
use talkone_ios::ipa::{self, BuildObserver};
use talkone_ios::{flutter, xcode};
use talkone_telemetry::TelemetryConfig;

#[derive(Parser)]
#[command(name = "talkone-ios")]
#[command(about = "Build and publish the TalkOne iOS app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, env = "TALKONE_CONFIG")]
    config: Option<PathBuf>,

    /// Project root (overrides project.root)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Destination directory (overrides publish.destination_dir)
    #[arg(long, global = true)]
    destination: Option<PathBuf>,

    /// Destination file name (overrides publish.artifact_name)
    #[arg(long, global = true)]
    artifact_name: Option<String>,

    /// How failures are surfaced: propagate or log-and-continue
    #[arg(long, global = true)]
    on_failure: Option<FailurePolicy>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean, build, archive and export the IPA, then publish it
    Build {
        /// Print each stage without running anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy an already exported IPA to the destination
    Publish {
        /// IPA to copy (defaults to publish.source, then the export output)
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Show the resolved stages
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose environment
    Doctor,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }
    output::set_quiet(cli.quiet);
    let mut telemetry = TelemetryConfig::from_verbosity(cli.verbose, cli.quiet);
    telemetry.ansi = !cli.no_color && std::io::stderr().is_terminal();
    talkone_telemetry::init_with_config(telemetry)?;
    tracing::debug!(session_id = %talkone_telemetry::session_id(), "cli started");

    let quiet = cli.quiet;
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };

    let exit_code = match cli.command {
        Commands::Build { dry_run: true } => run_dry_build(&config),
        Commands::Build { dry_run: false } => {
            run_build(&config, cli.on_failure.unwrap_or(config.build_policy))
        }
        Commands::Publish { .. } => {
            run_publish(&config, cli.on_failure.unwrap_or(config.publish_policy), quiet)
        }
        Commands::Plan { json } => run_plan(&config, json),
        Commands::Doctor => run_doctor(&config),
    };

    std::process::exit(exit_code);
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> talkone_core::Result<PipelineConfig> {
    let mut config = Config::load(cli.config.as_deref())?;
    let schema = &mut config.schema;

    if let Some(project) = &cli.project {
        schema.project.root = utf8_arg("--project", project)?;
    }
    if let Some(destination) = &cli.destination {
        schema.publish.destination_dir = Some(utf8_arg("--destination", destination)?);
    }
    if let Some(name) = &cli.artifact_name {
        schema.publish.artifact_name = Some(name.clone());
    }
    if let Commands::Publish { source: Some(source) } = &cli.command {
        schema.publish.source = Some(utf8_arg("--source", &std::path::absolute(source)?)?);
    }

    schema.resolve()
}

fn utf8_arg(flag: &str, path: &Path) -> talkone_core::Result<String> {
    path.to_str().map(str::to_owned).ok_or_else(|| {
        Error::config_validation(format!("{} is not valid UTF-8: {}", flag, path.display()))
    })
}

/// Prints `[k/n]` progress lines for the full runner
struct ConsoleReporter {
    total: usize,
}

impl PipelineObserver for ConsoleReporter {
    fn stage_started(&mut self, index: usize, _total: usize, stage: &Stage) {
        Status::step(index, self.total, &stage.description);
        Status::command(&stage.command_line());
    }

    fn stage_finished(&mut self, stage: &Stage, outcome: &StageOutcome) {
        if outcome.success {
            tracing::info!(stage = %stage.name, elapsed = %format_duration(outcome.duration), "stage finished");
        } else {
            tracing::warn!(stage = %stage.name, exit_code = outcome.exit_code, "stage rejected");
        }
    }
}

impl BuildObserver for ConsoleReporter {
    fn publish_started(&mut self, index: usize, _total: usize, _source: &Path, destination: &Path) {
        Status::step(index, self.total, "Copying IPA to destination...");
        Status::command(&destination.display().to_string());
    }
}

fn run_build(config: &PipelineConfig, policy: FailurePolicy) -> i32 {
    Status::header("Starting IPA build process...");

    let mut reporter = ConsoleReporter {
        total: ipa::total_steps(config),
    };

    match ipa::run_build(config, &mut SystemExecutor, &mut reporter) {
        Ok(outcome) => {
            Status::success(&format!(
                "IPA build complete! File saved to {}",
                outcome.published.destination.display()
            ));
            Status::info(&format!("File size: {}", format_size_exact(outcome.published.size)));
            Status::info(&format!(
                "Stages took {}",
                format_duration(outcome.report.total_duration())
            ));
            exit_codes::SUCCESS
        }
        Err(e) => report_failure("IPA build failed", &e, policy),
    }
}

fn run_dry_build(config: &PipelineConfig) -> i32 {
    Status::header("Dry run: nothing will be executed");

    let total = ipa::total_steps(config);
    let mut reporter = ConsoleReporter { total };
    let mut executor = DryRunExecutor::default();

    if let Err(e) = ipa::build_pipeline(config).run(&mut executor, &mut reporter) {
        Status::error(&e.to_string());
        return e.exit_code();
    }
    reporter.publish_started(total, total, &config.exported_package, &config.destination());

    Status::success(&format!("{} stages planned", executor.seen.len()));
    exit_codes::SUCCESS
}

fn run_publish(config: &PipelineConfig, policy: FailurePolicy, quiet: bool) -> i32 {
    let pb = progress::spinner("Copying IPA...", !quiet);

    match ipa::run_publish(config) {
        Ok(report) => {
            progress::finish_success(&pb, "Copied");
            Status::success(&format!(
                "Successfully copied IPA to {}",
                report.destination.display()
            ));
            Status::info(&format!("File size: {}", format_size_exact(report.size)));
            exit_codes::SUCCESS
        }
        Err(e) => {
            progress::finish_error(&pb, "Copy failed");
            report_failure("Error copying IPA", &e, policy)
        }
    }
}

/// Print the failure and pick the exit code the policy asks for
fn report_failure(prefix: &str, err: &Error, policy: FailurePolicy) -> i32 {
    Status::error(&format!("{}: {}", prefix, err));
    if policy == FailurePolicy::LogAndContinue {
        tracing::warn!(code = %err.code, "failure logged, exiting successfully");
    }
    policy.exit_code(err)
}

fn run_plan(config: &PipelineConfig, json: bool) -> i32 {
    let pipeline = ipa::build_pipeline(config);

    if json {
        let plan = serde_json::json!({
            "stages": pipeline.stages(),
            "publish": {
                "source": config.exported_package,
                "destination": config.destination(),
            },
            "policy": {
                "build": config.build_policy.to_string(),
                "publish": config.publish_policy.to_string(),
            },
        });
        return match serde_json::to_string_pretty(&plan) {
            Ok(text) => {
                println!("{}", text);
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&format!("Failed to serialize plan: {}", e));
                exit_codes::FAILURE
            }
        };
    }

    println!("{}", "Build plan".if_supports_color(Stream::Stdout, |t| t.bold()));
    println!();
    let total = pipeline.len() + 1;
    for (i, stage) in pipeline.stages().iter().enumerate() {
        let step = format!("[{}/{}]", i + 1, total);
        println!("  {} {}", step.if_supports_color(Stream::Stdout, |t| t.dimmed()), stage.name);
        println!("        {}", stage.command_line());
        if let Some(dir) = &stage.working_dir {
            println!("        {} {}", "in".if_supports_color(Stream::Stdout, |t| t.dimmed()), dir.display());
        }
    }
    let step = format!("[{}/{}]", total, total);
    println!("  {} publish", step.if_supports_color(Stream::Stdout, |t| t.dimmed()));
    println!("        {}", config.exported_package.display());
    println!(
        "        {} {}",
        "->".if_supports_color(Stream::Stdout, |t| t.dimmed()),
        config.destination().display()
    );

    exit_codes::SUCCESS
}

fn run_doctor(config: &PipelineConfig) -> i32 {
    println!("{}", "Environment Check".if_supports_color(Stream::Stdout, |t| t.bold()));
    println!();

    let mut healthy = true;

    if flutter::is_flutter_available(config) {
        match flutter::flutter_version(config) {
            Ok(version) => Status::success(&format!("Flutter: {}", version)),
            Err(_) => Status::success("Flutter: installed"),
        }
    } else {
        Status::error(&format!("Flutter: '{}' not found", config.flutter));
        healthy = false;
    }

    if xcode::is_xcode_available(config) {
        match xcode::xcode_version(config) {
            Ok(version) => Status::success(&format!("Xcode: {}", version)),
            Err(_) => Status::success("Xcode: installed"),
        }
    } else {
        Status::error(&format!("Xcode: '{}' not found", config.xcodebuild));
        healthy = false;
    }

    let paths = [
        ("Project root", &config.project_root),
        ("Platform directory", &config.platform_dir),
        ("Export options", &config.export_options),
        ("Destination", &config.destination_dir),
    ];
    for (label, path) in paths {
        if path.exists() {
            Status::success(&format!("{}: {}", label, path.display()));
        } else {
            Status::warning(&format!("{}: {} (missing)", label, path.display()));
        }
    }

    if healthy {
        exit_codes::SUCCESS
    } else {
        exit_codes::COMMAND_NOT_FOUND
    }
}
