//! Configuration schema definitions
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) describes the stock Flutter iOS layout.

use crate::error::{exit_codes, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Project layout
    #[serde(default)]
    pub project: ProjectConfig,

    /// External executables
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Archive step settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Export step settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Publish step settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Failure policies
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project root; all relative invocations are anchored here
    #[serde(default = "default_root")]
    pub root: String,

    /// Platform subtree, relative to the root
    #[serde(default = "default_platform_dir")]
    pub platform_dir: String,

    /// Build output directory, relative to the root
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            platform_dir: default_platform_dir(),
            build_dir: default_build_dir(),
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}

fn default_platform_dir() -> String {
    "ios".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

/// External executables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Flutter executable, looked up on `PATH` unless a path is given
    #[serde(default = "default_flutter")]
    pub flutter: String,

    /// Xcode build executable
    #[serde(default = "default_xcodebuild")]
    pub xcodebuild: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            flutter: default_flutter(),
            xcodebuild: default_xcodebuild(),
        }
    }
}

fn default_flutter() -> String {
    "flutter".to_string()
}

fn default_xcodebuild() -> String {
    "xcodebuild".to_string()
}

/// Archive step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Xcode workspace, relative to the platform directory
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Scheme to archive
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Build configuration
    #[serde(default = "default_configuration")]
    pub configuration: String,

    /// Archive bundle name, created inside the build directory
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Signing team passed as `DEVELOPMENT_TEAM=<id>`; must not be empty
    #[serde(default = "default_development_team")]
    pub development_team: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            scheme: default_scheme(),
            configuration: default_configuration(),
            archive_name: default_archive_name(),
            development_team: default_development_team(),
        }
    }
}

fn default_workspace() -> String {
    "Runner.xcworkspace".to_string()
}

fn default_scheme() -> String {
    "Runner".to_string()
}

fn default_configuration() -> String {
    "Release".to_string()
}

fn default_archive_name() -> String {
    "TalkOne.xcarchive".to_string()
}

fn default_development_team() -> String {
    "658363YSD7".to_string()
}

/// Export step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export directory, relative to the build directory
    #[serde(default = "default_export_subdir")]
    pub export_subdir: String,

    /// Export options descriptor, relative to the platform directory
    #[serde(default = "default_options_plist")]
    pub options_plist: String,

    /// Package file produced by the export, relative to the export directory
    #[serde(default = "default_exported_package")]
    pub exported_package: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_subdir: default_export_subdir(),
            options_plist: default_options_plist(),
            exported_package: default_exported_package(),
        }
    }
}

fn default_export_subdir() -> String {
    "ipa".to_string()
}

fn default_options_plist() -> String {
    "ExportOptions.plist".to_string()
}

fn default_exported_package() -> String {
    "Runner.ipa".to_string()
}

/// Publish step settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Destination directory; the user's desktop when unset
    #[serde(default)]
    pub destination_dir: Option<String>,

    /// Fixed destination filename; composed from product/version/platform/date when unset
    #[serde(default)]
    pub artifact_name: Option<String>,

    /// Product name used in the composed file name
    #[serde(default = "default_product")]
    pub product: String,

    /// Version used in the composed file name
    #[serde(default = "default_version")]
    pub version: String,

    /// Platform label used in the composed file name
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Package copied by `publish`; the exported package when unset
    #[serde(default)]
    pub source: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            destination_dir: None,
            artifact_name: None,
            product: default_product(),
            version: default_version(),
            platform: default_platform(),
            source: None,
        }
    }
}

fn default_product() -> String {
    "TalkOne".to_string()
}

fn default_version() -> String {
    "0.9.1".to_string()
}

fn default_platform() -> String {
    "iOS".to_string()
}

/// How a failure is surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort and exit non-zero
    Propagate,
    /// Print the cause and exit zero
    LogAndContinue,
}

impl FailurePolicy {
    /// Process exit code for a run that ended in `err`
    pub fn exit_code(self, err: &Error) -> i32 {
        match self {
            Self::Propagate => err.exit_code(),
            Self::LogAndContinue => exit_codes::SUCCESS,
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Propagate => f.write_str("propagate"),
            Self::LogAndContinue => f.write_str("log-and-continue"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "propagate" => Ok(Self::Propagate),
            "log-and-continue" => Ok(Self::LogAndContinue),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'propagate' or 'log-and-continue')",
                other
            )),
        }
    }
}

/// Failure policy per entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy for the full runner
    #[serde(default = "default_build_policy")]
    pub build: FailurePolicy,

    /// Policy for the standalone publisher
    #[serde(default = "default_publish_policy")]
    pub publish: FailurePolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            build: default_build_policy(),
            publish: default_publish_policy(),
        }
    }
}

fn default_build_policy() -> FailurePolicy {
    FailurePolicy::Propagate
}

fn default_publish_policy() -> FailurePolicy {
    FailurePolicy::LogAndContinue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("propagate".parse::<FailurePolicy>(), Ok(FailurePolicy::Propagate));
        assert_eq!(
            "log-and-continue".parse::<FailurePolicy>(),
            Ok(FailurePolicy::LogAndContinue)
        );
        assert!("ignore".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_failure_policy_display_round_trips() {
        for policy in [FailurePolicy::Propagate, FailurePolicy::LogAndContinue] {
            assert_eq!(policy.to_string().parse::<FailurePolicy>(), Ok(policy));
        }
    }

    #[test]
    fn test_exit_code_per_policy() {
        let err = Error::artifact_not_found("/missing/Runner.ipa");

        assert_eq!(FailurePolicy::Propagate.exit_code(&err), exit_codes::FAILURE);
        assert_eq!(FailurePolicy::LogAndContinue.exit_code(&err), exit_codes::SUCCESS);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [archive]
            development_team = "ABCDE12345"

            [policy]
            publish = "propagate"
            "#,
        )
        .unwrap();

        assert_eq!(schema.archive.scheme, "Runner");
        assert_eq!(schema.archive.development_team, "ABCDE12345");
        assert_eq!(schema.policy.build, FailurePolicy::Propagate);
        assert_eq!(schema.policy.publish, FailurePolicy::Propagate);
        assert_eq!(schema.export.exported_package, "Runner.ipa");
    }

    #[test]
    fn test_signing_team_has_default() {
        let schema: ConfigSchema = toml::from_str("[archive]\nscheme = \"Runner\"\n").unwrap();
        assert_eq!(schema.archive.development_team, "658363YSD7");
        assert_eq!(ConfigSchema::default().archive.development_team, "658363YSD7");
    }
}
