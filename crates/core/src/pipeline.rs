//! Sequential stage runner
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s. Each stage is one external
//! command with an argument vector and an optional working directory. Stages
//! run one after another through a [`CommandExecutor`]; the first stage whose
//! exit code is rejected by its success predicate aborts the run, and no later
//! stage is executed.

use crate::error::{Error, Result};
use crate::process::run_command_streaming_in_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default success predicate: exit code zero.
pub fn exit_ok(code: i32) -> bool {
    code == 0
}

/// One external command invocation within a pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Short identifier, e.g. `archive`
    pub name: String,
    /// Progress message shown before the stage starts
    pub description: String,
    /// Executable to invoke
    pub program: String,
    /// Argument vector
    pub args: Vec<String>,
    /// Working directory override for this stage only
    pub working_dir: Option<PathBuf>,
    #[serde(skip, default = "default_success")]
    success: fn(i32) -> bool,
}

fn default_success() -> fn(i32) -> bool {
    exit_ok
}

impl Stage {
    /// Create a stage with no arguments that runs in the inherited directory
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        program: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            success: exit_ok,
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run this stage in `dir`
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Replace the success predicate
    pub fn succeeds_when(mut self, predicate: fn(i32) -> bool) -> Self {
        self.success = predicate;
        self
    }

    /// Whether `exit_code` counts as success for this stage
    pub fn accepts(&self, exit_code: i32) -> bool {
        (self.success)(exit_code)
    }

    /// Printable command line, program followed by arguments
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs stage commands.
///
/// Implementations return the exit code of the command; `Err` is reserved for
/// commands that could not be started at all.
pub trait CommandExecutor {
    /// Execute `stage` to completion
    fn execute(&mut self, stage: &Stage) -> Result<i32>;
}

/// Executes stages as real child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(&mut self, stage: &Stage) -> Result<i32> {
        run_command_streaming_in_dir(&stage.program, &stage.args, stage.working_dir.as_deref())
    }
}

/// Records stages instead of running them
#[derive(Debug, Default, Clone)]
pub struct DryRunExecutor {
    /// Stages seen so far, in order
    pub seen: Vec<Stage>,
}

impl CommandExecutor for DryRunExecutor {
    fn execute(&mut self, stage: &Stage) -> Result<i32> {
        tracing::info!(stage = %stage.name, command = %stage.command_line(), "dry run");
        self.seen.push(stage.clone());
        Ok(0)
    }
}

/// Hooks for reporting pipeline progress
pub trait PipelineObserver {
    /// Called before stage `index` (1-based) of `total` starts
    fn stage_started(&mut self, _index: usize, _total: usize, _stage: &Stage) {}

    /// Called after a stage exits, whatever the exit code
    fn stage_finished(&mut self, _stage: &Stage, _outcome: &StageOutcome) {}
}

impl PipelineObserver for () {}

/// Result of running one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    /// Stage name
    pub name: String,
    /// Exit code reported by the executor
    pub exit_code: i32,
    /// Whether the success predicate accepted the exit code
    pub success: bool,
    /// Wall-clock time spent in the stage
    pub duration: Duration,
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Outcomes of the stages that actually ran
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineReport {
    /// True when every executed stage succeeded
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Total time across all executed stages
    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.duration).sum()
    }
}

/// Ordered list of stages
#[derive(Debug, Clone, Default, Serialize)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, stopping at the first failure.
    ///
    /// Returns `Error::stage_failed` for a rejected exit code. Errors from the
    /// executor (e.g. the program is missing) are returned unchanged with the
    /// stage name attached as context.
    pub fn run(
        &self,
        executor: &mut dyn CommandExecutor,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineReport> {
        let total = self.stages.len();
        let mut report = PipelineReport::default();

        for (i, stage) in self.stages.iter().enumerate() {
            observer.stage_started(i + 1, total, stage);
            tracing::debug!(
                stage = %stage.name,
                command = %stage.command_line(),
                cwd = ?stage.working_dir.as_deref().map(Path::display),
                "starting stage"
            );

            let start = Instant::now();
            let exit_code = executor
                .execute(stage)
                .map_err(|e| e.with_context(format!("While running stage '{}'", stage.name)))?;

            let outcome = StageOutcome {
                name: stage.name.clone(),
                exit_code,
                success: stage.accepts(exit_code),
                duration: start.elapsed(),
            };
            observer.stage_finished(stage, &outcome);
            let success = outcome.success;
            report.outcomes.push(outcome);

            if !success {
                tracing::error!(stage = %stage.name, exit_code, "stage failed, aborting pipeline");
                return Err(Error::stage_failed(&stage.name, &stage.command_line(), exit_code));
            }
            tracing::info!(stage = %stage.name, "stage complete");
        }

        Ok(report)
    }
}
