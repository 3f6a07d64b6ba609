//! Core utilities for TalkOne build tooling
//!
//! This crate provides the platform-independent pieces of the build pipeline:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Process execution**: Streaming command execution with per-command working directories
//! - **Configuration**: TOML-based pipeline configuration with defaults and validation
//! - **Pipeline**: Sequential stage runner with abort-on-failure semantics
//!
//! # Example
//!
//! ```rust,no_run
//! use talkone_core::pipeline::{Pipeline, Stage, SystemExecutor};
//!
//! let pipeline = Pipeline::new()
//!     .stage(Stage::new("clean", "Cleaning previous builds...", "flutter").arg("clean"));
//!
//! let report = pipeline.run(&mut SystemExecutor, &mut ()).expect("pipeline failed");
//! assert!(report.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, FailurePolicy, PipelineConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::pipeline::{
        CommandExecutor, Pipeline, PipelineObserver, PipelineReport, Stage, SystemExecutor,
    };
}
