//! Error types for a rules deployment.
//!
//! Every variant renders as the line(s) the reporter prints before exiting
//! with status 1, so `Display` is the user-facing message.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for deployment operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors that abort a deployment
#[derive(Error, Debug)]
pub enum DeployError {
    /// Rules file missing or unreadable
    #[error("Error: failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rules file is not valid JSON
    #[error("Error: Invalid JSON in {}: {message}", path.display())]
    Validation { path: PathBuf, message: String },

    /// The credential helper failed or produced no token
    #[error("Error getting access token: {0}")]
    Credential(String),

    /// The rules API answered with a non-2xx status
    #[error("Error deploying rules: {status}\nResponse: {body}")]
    Deployment { status: u16, body: String },

    /// No usable response was obtained (DNS, TLS, reset, undecodable body)
    #[error("Error: {0}")]
    Transport(String),

    /// The confirmation prompt could not be shown
    #[error("Error: {0}")]
    Prompt(String),

    /// Operator declined the confirmation prompt
    #[error("Deployment cancelled.")]
    Cancelled,
}
