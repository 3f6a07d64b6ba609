//! Structured error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context
//! - Recovery suggestions
//! - Error codes for programmatic handling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Serialization or other internal failure
    Internal = 1001,

    // IO errors (2xxx)
    /// Unclassified filesystem error
    IoError = 2000,
    /// A file the operation needed does not exist
    FileNotFound = 2001,
    /// The filesystem refused access
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Configuration could not be turned into settings
    ConfigError = 3000,
    /// An explicitly named config file is missing
    ConfigNotFound = 3001,
    /// The config file is not valid TOML for the schema
    ConfigParseError = 3002,
    /// A config value is empty or malformed
    ConfigValidationError = 3003,

    // Process errors (5xxx)
    /// A child process could not be started
    ProcessError = 5000,
    /// The program is not on `PATH`
    CommandNotFound = 5001,
    /// A pipeline stage exited with a rejected code
    StageFailed = 5004,

    // Publish errors (9xxx)
    /// The artifact to publish does not exist
    ArtifactNotFound = 9001,
    /// Copying the artifact failed
    CopyFailed = 9002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            9 => "Publish",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Exit code a CLI should terminate with for this error
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::ConfigError
            | ErrorCode::ConfigNotFound
            | ErrorCode::ConfigParseError
            | ErrorCode::ConfigValidationError => exit_codes::CONFIG_ERROR,
            ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            _ => exit_codes::FAILURE,
        }
    }

    // Convenience constructors

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Explicitly requested config file is missing
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .talkone.toml file or use --config to specify a path")
    }

    /// Config value failed validation
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigValidationError, message)
    }

    /// Child process could not be started
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// Program is not installed or not on `PATH`
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    /// Stage exited with a code its predicate rejected
    pub fn stage_failed(stage: &str, command_line: &str, exit_code: i32) -> Self {
        Self::new(
            ErrorCode::StageFailed,
            format!("Stage '{}' failed with exit code {}", stage, exit_code),
        )
        .with_context(format!("Command: {}", command_line))
    }

    /// Publish source does not exist
    pub fn artifact_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ArtifactNotFound,
            format!("Source not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Run the full build first or pass --source with the exported .ipa")
    }

    /// Copy to the destination failed with `cause`
    pub fn copy_failed(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        cause: std::io::Error,
    ) -> Self {
        Self::new(
            ErrorCode::CopyFailed,
            format!(
                "Copy failed: {} -> {}: {}",
                source.as_ref().display(),
                destination.as_ref().display(),
                cause
            ),
        )
        .with_source(cause)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Run completed, or the failure was logged and swallowed
    pub const SUCCESS: i32 = 0;
    /// Stage, artifact or copy failure
    pub const FAILURE: i32 = 1;
    /// Configuration problem
    pub const CONFIG_ERROR: i32 = 3;
    /// Required tool is missing
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}
