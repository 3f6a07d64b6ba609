//! Configuration loading, schema definitions, and resolution
//!
//! A TOML file is parsed into [`ConfigSchema`], which is then resolved into
//! the absolute paths of a [`PipelineConfig`].

mod loader;
mod resolve;
mod schema;

pub use loader::Config;
pub use resolve::{compose_artifact_name, PipelineConfig};
pub use schema::*;
