// Credential module: obtains the bearer token presented to the rules API.
// The default source shells out to the gcloud CLI; a static token can be
// supplied instead so no subprocess is needed.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{DeployError, Result};

/// Command line run by default to print an access token.
pub const DEFAULT_TOKEN_COMMAND: [&str; 4] =
    ["gcloud", "auth", "application-default", "print-access-token"];

/// Anything that can hand out a bearer token.
pub trait TokenSource {
    fn access_token(&self) -> Result<String>;
}

/// Runs an external command and reads the token from its stdout.
#[derive(Debug, Clone)]
pub struct CommandTokenSource {
    argv: Vec<String>,
}

impl CommandTokenSource {
    pub fn new(argv: Vec<String>) -> Self {
        CommandTokenSource { argv }
    }
}

impl Default for CommandTokenSource {
    fn default() -> Self {
        CommandTokenSource::new(DEFAULT_TOKEN_COMMAND.iter().map(|s| s.to_string()).collect())
    }
}

impl TokenSource for CommandTokenSource {
    fn access_token(&self) -> Result<String> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| DeployError::Credential("token command is empty".to_string()))?;
        info!(command = %self.argv.join(" "), "requesting access token");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DeployError::Credential(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut message = format!("{program} exited with {}", output.status);
            if !stderr.trim().is_empty() {
                message.push_str(": ");
                message.push_str(stderr.trim());
            }
            if is_gcloud(program) && !adc_file_present() {
                message.push_str(
                    "\nhint: no application default credentials found; run `gcloud auth application-default login`",
                );
            }
            return Err(DeployError::Credential(message));
        }

        let token = parse_token(&output.stdout)?;
        debug!(len = token.len(), "access token obtained");
        Ok(token)
    }
}

/// A token known up front, e.g. from `FIREBASE_ACCESS_TOKEN`.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<String> {
        parse_token(self.0.as_bytes())
    }
}

/// Trim helper output down to the token; empty output is an error.
fn parse_token(raw: &[u8]) -> Result<String> {
    let token = String::from_utf8_lossy(raw).trim().to_string();
    if token.is_empty() {
        return Err(DeployError::Credential(
            "credential helper printed an empty token".to_string(),
        ));
    }
    Ok(token)
}

fn is_gcloud(program: &str) -> bool {
    std::path::Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s == "gcloud")
}

/// Location gcloud writes application default credentials to.
pub fn adc_file_path() -> Option<PathBuf> {
    Some(gcloud_config_dir()?.join("application_default_credentials.json"))
}

/// gcloud's config dir: `CLOUDSDK_CONFIG`, else `%APPDATA%\gcloud` on
/// Windows and `~/.config/gcloud` everywhere else (macOS included).
fn gcloud_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(dir));
    }
    if cfg!(windows) {
        dirs::config_dir().map(|dir| dir.join("gcloud"))
    } else {
        dirs::home_dir().map(|home| home.join(".config").join("gcloud"))
    }
}

fn adc_file_present() -> bool {
    adc_file_path().is_some_and(|p| p.exists())
}
