//! Flutter command stages
//!
//! All three stages run in the project root.

use talkone_core::config::PipelineConfig;
use talkone_core::error::Result;
use talkone_core::pipeline::Stage;
use talkone_core::process::{command_exists, run_command};

/// Check if the configured flutter executable is available
pub fn is_flutter_available(config: &PipelineConfig) -> bool {
    command_exists(&config.flutter)
}

/// First line of `flutter --version`
pub fn flutter_version(config: &PipelineConfig) -> Result<String> {
    let result = run_command(&config.flutter, &["--version"])?;
    Ok(result.stdout.lines().next().unwrap_or("Unknown").to_string())
}

/// `flutter clean`
pub fn clean(config: &PipelineConfig) -> Stage {
    Stage::new("clean", "Cleaning previous builds...", &config.flutter)
        .arg("clean")
        .in_dir(&config.project_root)
}

/// `flutter pub get`
pub fn pub_get(config: &PipelineConfig) -> Stage {
    Stage::new("pub-get", "Getting Flutter dependencies...", &config.flutter)
        .args(["pub", "get"])
        .in_dir(&config.project_root)
}

/// `flutter build ios --release`
pub fn build_ios_release(config: &PipelineConfig) -> Stage {
    Stage::new("build", "Building iOS app...", &config.flutter)
        .args(["build", "ios", "--release"])
        .in_dir(&config.project_root)
}
