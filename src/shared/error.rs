use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success - no vulnerabilities at or above the requested severity
    Success,
    /// Vulnerabilities were found at or above the `--severity` threshold
    VulnerabilitiesDetected,
    /// `project exists` found no such project; shares code 1
    NotFound,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments,
    /// Application error (API error, network error, invalid reference, etc.)
    ApplicationError,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::VulnerabilitiesDetected | ExitCode::NotFound => 1,
            ExitCode::InvalidArguments => 2,
            ExitCode::ApplicationError => 3,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::VulnerabilitiesDetected => write!(f, "Vulnerabilities Detected (1)"),
            ExitCode::NotFound => write!(f, "Not Found (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for Harbor CLI operations.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// keeping user-facing messages next to the variants they describe.
#[derive(Debug, Error)]
pub enum HarborError {
    #[error("Invalid reference: '{input}'\nReason: {reason}\n\n💡 Hint: Use <project>/<repository>[:tag|@digest]")]
    InvalidReference { input: String, reason: String },

    #[error("Harbor API error (code: {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request to {url} failed: {details}")]
    Transport { url: String, details: String },

    #[error("Failed to decode {what}: {details}")]
    Decode { what: String, details: String },

    #[error("{key} is not configured\n\n💡 Hint: {hint}")]
    ConfigMissing { key: String, hint: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Timed out after {seconds}s waiting for {what}")]
    WaitTimeout { what: String, seconds: u64 },

    #[error("Wait for {what} was cancelled")]
    WaitCancelled { what: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    /// Validation error for command arguments that clap cannot check
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl HarborError {
    /// True for HTTP 404 responses
    pub fn is_not_found(&self) -> bool {
        matches!(self, HarborError::Api { status: 404, .. })
    }

    /// True for HTTP 409 responses
    pub fn is_conflict(&self) -> bool {
        matches!(self, HarborError::Api { status: 409, .. })
    }

    /// True for HTTP 401 responses
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HarborError::Api { status: 401, .. })
    }
}
