//! Resolution of the configuration schema into concrete paths

use super::schema::{ConfigSchema, FailurePolicy};
use crate::error::{Error, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Fully resolved pipeline settings.
///
/// All paths are absolute and valid UTF-8 once resolved; nothing here
/// touches the process working directory.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Working directory of the Flutter stages
    pub project_root: PathBuf,
    /// Working directory of the Xcode stages
    pub platform_dir: PathBuf,
    /// Build output directory
    pub build_dir: PathBuf,

    /// Flutter executable
    pub flutter: String,
    /// Xcode build executable
    pub xcodebuild: String,

    /// Xcode workspace, relative to the platform directory
    pub workspace: String,
    /// Scheme to archive
    pub scheme: String,
    /// Build configuration
    pub configuration: String,
    /// Signing team override
    pub development_team: String,
    /// Archive bundle written by the archive stage
    pub archive_path: PathBuf,

    /// Directory the export stage writes into
    pub export_dir: PathBuf,
    /// Export options descriptor
    pub export_options: PathBuf,
    /// Package produced by the export stage
    pub exported_package: PathBuf,

    /// Directory the artifact is published into
    pub destination_dir: PathBuf,
    /// File name of the published artifact
    pub artifact_name: String,
    /// Source used by the standalone publisher
    pub publish_source: PathBuf,

    /// Failure policy of the full runner
    pub build_policy: FailurePolicy,
    /// Failure policy of the standalone publisher
    pub publish_policy: FailurePolicy,
}

impl PipelineConfig {
    /// Final location of the published artifact
    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.artifact_name)
    }
}

impl ConfigSchema {
    /// Resolve using today's local date for the artifact name
    pub fn resolve(&self) -> Result<PipelineConfig> {
        self.resolve_on(Local::now().date_naive())
    }

    /// Resolve with an explicit build date
    pub fn resolve_on(&self, date: NaiveDate) -> Result<PipelineConfig> {
        self.validate()?;

        let project_root = std::path::absolute(expand(&self.project.root)?)?;
        let platform_dir = project_root.join(expand(&self.project.platform_dir)?);
        let build_dir = project_root.join(expand(&self.project.build_dir)?);
        let export_dir = build_dir.join(&self.export.export_subdir);
        let exported_package = export_dir.join(&self.export.exported_package);

        let destination_dir = match &self.publish.destination_dir {
            Some(dir) => std::path::absolute(expand(dir)?)?,
            None => default_destination_dir()?,
        };

        let artifact_name = match &self.publish.artifact_name {
            Some(name) => name.clone(),
            None => compose_artifact_name(
                &self.publish.product,
                &self.publish.version,
                &self.publish.platform,
                date,
            ),
        };

        let publish_source = match &self.publish.source {
            Some(src) => project_root.join(expand(src)?),
            None => exported_package.clone(),
        };

        let archive_path = build_dir.join(&self.archive.archive_name);
        let export_options = platform_dir.join(expand(&self.export.options_plist)?);

        // Paths are handed to external tools as UTF-8 arguments.
        for (key, path) in [
            ("project.root", &project_root),
            ("project.platform_dir", &platform_dir),
            ("project.build_dir", &build_dir),
            ("archive.archive_name", &archive_path),
            ("export.export_subdir", &export_dir),
            ("export.options_plist", &export_options),
            ("publish.destination_dir", &destination_dir),
            ("publish.source", &publish_source),
        ] {
            require_utf8(key, path)?;
        }

        Ok(PipelineConfig {
            archive_path,
            export_options,
            project_root,
            platform_dir,
            build_dir,
            flutter: self.tools.flutter.clone(),
            xcodebuild: self.tools.xcodebuild.clone(),
            workspace: self.archive.workspace.clone(),
            scheme: self.archive.scheme.clone(),
            configuration: self.archive.configuration.clone(),
            development_team: self.archive.development_team.clone(),
            export_dir,
            exported_package,
            destination_dir,
            artifact_name,
            publish_source,
            build_policy: self.policy.build,
            publish_policy: self.policy.publish,
        })
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("archive.workspace", &self.archive.workspace),
            ("archive.scheme", &self.archive.scheme),
            ("archive.configuration", &self.archive.configuration),
            ("archive.archive_name", &self.archive.archive_name),
            ("archive.development_team", &self.archive.development_team),
            ("export.exported_package", &self.export.exported_package),
            ("tools.flutter", &self.tools.flutter),
            ("tools.xcodebuild", &self.tools.xcodebuild),
            ("publish.product", &self.publish.product),
            ("publish.version", &self.publish.version),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config_validation(format!("{} must not be empty", key)));
            }
        }

        if let Some(name) = &self.publish.artifact_name {
            if name.trim().is_empty() || name.contains('/') {
                return Err(Error::config_validation(format!(
                    "publish.artifact_name must be a plain file name, got '{}'",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// `<product>_v<version>_<platform>_<YYYYMMDD>.ipa`
pub fn compose_artifact_name(product: &str, version: &str, platform: &str, date: NaiveDate) -> String {
    format!(
        "{}_v{}_{}_{}.ipa",
        product,
        version,
        platform,
        date.format("%Y%m%d")
    )
}

fn expand(raw: &str) -> Result<PathBuf> {
    shellexpand::full(raw)
        .map(|s| PathBuf::from(s.as_ref()))
        .map_err(|e| Error::config(format!("Failed to expand path '{}': {}", raw, e)))
}

fn require_utf8(key: &str, path: &Path) -> Result<()> {
    if path.to_str().is_some() {
        return Ok(());
    }
    Err(Error::config_validation(format!(
        "{} resolves to a path that is not valid UTF-8: {}",
        key,
        path.display()
    )))
}

fn default_destination_dir() -> Result<PathBuf> {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .ok_or_else(|| {
            Error::config("Could not determine the desktop directory")
                .with_suggestion("Set publish.destination_dir or pass --destination")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()
    }

    fn schema_at(root: &Path) -> ConfigSchema {
        let mut schema = ConfigSchema::default();
        schema.project.root = root.to_string_lossy().into_owned();
        schema.publish.destination_dir = Some("/tmp/desktop".to_string());
        schema
    }

    #[test]
    fn test_compose_artifact_name() {
        assert_eq!(
            compose_artifact_name("TalkOne", "0.9.1", "iOS", date()),
            "TalkOne_v0.9.1_iOS_20250703.ipa"
        );
    }

    #[test]
    fn test_default_layout() {
        let resolved = schema_at(Path::new("/work/app")).resolve_on(date()).unwrap();

        assert_eq!(resolved.platform_dir, Path::new("/work/app/ios"));
        assert_eq!(resolved.archive_path, Path::new("/work/app/build/TalkOne.xcarchive"));
        assert_eq!(resolved.export_dir, Path::new("/work/app/build/ipa"));
        assert_eq!(resolved.exported_package, Path::new("/work/app/build/ipa/Runner.ipa"));
        assert_eq!(resolved.export_options, Path::new("/work/app/ios/ExportOptions.plist"));
        assert_eq!(resolved.publish_source, resolved.exported_package);
        assert_eq!(
            resolved.destination(),
            Path::new("/tmp/desktop/TalkOne_v0.9.1_iOS_20250703.ipa")
        );
        assert_eq!(resolved.development_team, "658363YSD7");
        assert_eq!(resolved.build_policy, FailurePolicy::Propagate);
        assert_eq!(resolved.publish_policy, FailurePolicy::LogAndContinue);
    }

    #[test]
    fn test_fixed_artifact_name_wins() {
        let mut schema = schema_at(Path::new("/work/app"));
        schema.publish.artifact_name = Some("Nightly.ipa".to_string());

        let resolved = schema.resolve_on(date()).unwrap();
        assert_eq!(resolved.artifact_name, "Nightly.ipa");
    }

    #[test]
    fn test_publish_source_relative_to_root() {
        let mut schema = schema_at(Path::new("/work/app"));
        schema.publish.source = Some("build/ios/iphoneos/TalkOne.ipa".to_string());

        let resolved = schema.resolve_on(date()).unwrap();
        assert_eq!(
            resolved.publish_source,
            Path::new("/work/app/build/ios/iphoneos/TalkOne.ipa")
        );
    }

    #[test]
    fn test_empty_scheme_rejected() {
        let mut schema = schema_at(Path::new("/work/app"));
        schema.archive.scheme = "  ".to_string();

        let err = schema.resolve_on(date()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("archive.scheme"));
    }

    #[test]
    fn test_artifact_name_with_separator_rejected() {
        let mut schema = schema_at(Path::new("/work/app"));
        schema.publish.artifact_name = Some("nested/App.ipa".to_string());

        assert!(schema.resolve_on(date()).is_err());
    }

    #[test]
    fn test_empty_signing_team_rejected() {
        let mut schema = schema_at(Path::new("/work/app"));
        schema.archive.development_team = String::new();

        let err = schema.resolve_on(date()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("archive.development_team"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/tmp/\xffTalkOne"));
        let err = require_utf8("publish.destination_dir", path).unwrap_err();

        assert_eq!(err.code, ErrorCode::ConfigValidationError);
        assert!(err.message.contains("publish.destination_dir"));
        assert!(require_utf8("project.root", Path::new("/work/app")).is_ok());
    }
}
