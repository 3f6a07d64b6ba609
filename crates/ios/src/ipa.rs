//! IPA build runner and standalone publisher
//!
//! The full runner executes clean, pub get, build, archive and export, then
//! publishes the exported package. The standalone publisher performs only the
//! final copy. How either one's failure is surfaced is decided by the caller
//! through [`FailurePolicy`](talkone_core::config::FailurePolicy).

use crate::publish::{publish_artifact, PublishReport};
use crate::{flutter, xcode};
use serde::Serialize;
use std::path::Path;
use talkone_core::config::PipelineConfig;
use talkone_core::error::Result;
use talkone_core::pipeline::{CommandExecutor, Pipeline, PipelineObserver, PipelineReport};

/// Progress hooks for the full runner
pub trait BuildObserver: PipelineObserver {
    /// Called before the publish step, which is always the last one
    fn publish_started(&mut self, _index: usize, _total: usize, _source: &Path, _destination: &Path) {}
}

impl BuildObserver for () {}

/// Outcome of a successful full build
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    /// Per-stage outcomes
    pub report: PipelineReport,
    /// The published artifact
    pub published: PublishReport,
}

/// The five external command stages, in execution order
pub fn build_pipeline(config: &PipelineConfig) -> Pipeline {
    Pipeline::new()
        .stage(flutter::clean(config))
        .stage(flutter::pub_get(config))
        .stage(flutter::build_ios_release(config))
        .stage(xcode::archive(config))
        .stage(xcode::export_archive(config))
}

/// Total number of steps reported by the full runner, publish included
pub fn total_steps(config: &PipelineConfig) -> usize {
    build_pipeline(config).len() + 1
}

/// Run every stage, then publish the exported package.
///
/// Any failing stage aborts before later stages or the publish step run.
pub fn run_build<O: BuildObserver>(
    config: &PipelineConfig,
    executor: &mut dyn CommandExecutor,
    observer: &mut O,
) -> Result<BuildOutcome> {
    let pipeline = build_pipeline(config);
    let total = pipeline.len() + 1;

    tracing::info!(
        project = %config.project_root.display(),
        stages = pipeline.len(),
        "starting IPA build"
    );
    let report = pipeline.run(executor, observer)?;

    let destination = config.destination();
    observer.publish_started(total, total, &config.exported_package, &destination);
    let published = publish_artifact(&config.exported_package, &destination)?;

    Ok(BuildOutcome { report, published })
}

/// Publish `config.publish_source` without building
pub fn run_publish(config: &PipelineConfig) -> Result<PublishReport> {
    publish_artifact(&config.publish_source, &config.destination())
}
