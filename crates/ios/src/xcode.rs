//! Xcode archive and export stages
//!
//! Both stages run inside the platform directory so the workspace and the
//! export options plist resolve the same way they do for a manual build.
//! Resolved paths are UTF-8, so converting them to arguments is lossless.

use talkone_core::config::PipelineConfig;
use talkone_core::error::Result;
use talkone_core::pipeline::Stage;
use talkone_core::process::{command_exists, run_command};

/// Check if xcodebuild is available
pub fn is_xcode_available(config: &PipelineConfig) -> bool {
    command_exists(&config.xcodebuild)
}

/// Get Xcode version
pub fn xcode_version(config: &PipelineConfig) -> Result<String> {
    let result = run_command(&config.xcodebuild, &["-version"])?;
    Ok(result.stdout.lines().next().unwrap_or("Unknown").to_string())
}

/// Archive the workspace into `config.archive_path`
pub fn archive(config: &PipelineConfig) -> Stage {
    Stage::new("archive", "Creating archive...", &config.xcodebuild)
        .args(["-workspace", config.workspace.as_str()])
        .args(["-scheme", config.scheme.as_str()])
        .args(["-configuration", config.configuration.as_str()])
        .arg("-archivePath")
        .arg(config.archive_path.to_string_lossy())
        .arg("archive")
        .arg(format!("DEVELOPMENT_TEAM={}", config.development_team))
        .in_dir(&config.platform_dir)
}

/// Export the archive into `config.export_dir`
pub fn export_archive(config: &PipelineConfig) -> Stage {
    Stage::new("export", "Exporting IPA...", &config.xcodebuild)
        .arg("-exportArchive")
        .arg("-archivePath")
        .arg(config.archive_path.to_string_lossy())
        .arg("-exportPath")
        .arg(config.export_dir.to_string_lossy())
        .arg("-exportOptionsPlist")
        .arg(config.export_options.to_string_lossy())
        .in_dir(&config.platform_dir)
}
