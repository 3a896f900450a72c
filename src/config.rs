//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::DEFAULT_ENDPOINT;
use crate::credentials::{CommandTokenSource, StaticToken, TokenSource, DEFAULT_TOKEN_COMMAND};

/// Deploy a Firestore rules file as a new release of a Firebase project.
#[derive(Parser, Debug)]
#[command(name = "deploy-rules", version, about, long_about = None)]
pub struct Cli {
    /// Firebase project id to deploy to
    #[arg(short, long, env = "FIREBASE_PROJECT")]
    pub project: String,

    /// Rules file to upload (must be JSON)
    #[arg(short, long, env = "FIRESTORE_RULES", default_value = "firestore.rules")]
    pub rules: PathBuf,

    /// Base URL of the rules API
    #[arg(long, env = "FIREBASE_RULES_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token to use instead of running the token command
    #[arg(long, env = "FIREBASE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Command that prints an access token (shell-style quoting)
    #[arg(
        long,
        value_name = "CMD",
        conflicts_with = "access_token",
        value_parser = parse_token_command
    )]
    pub token_command: Option<TokenCommand>,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Validate and print the payload without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Ask for confirmation before sending
    #[arg(long)]
    pub confirm: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// A `--token-command` value: the text as given and its argv.
#[derive(Debug, Clone)]
pub struct TokenCommand {
    pub raw: String,
    pub argv: Vec<String>,
}

/// Split a command line with shell quoting rules; empty commands are a
/// usage error.
fn parse_token_command(raw: &str) -> Result<TokenCommand, String> {
    let argv = shell_words::split(raw).map_err(|e| format!("cannot parse command: {e}"))?;
    if argv.is_empty() {
        return Err("command is empty".to_string());
    }
    Ok(TokenCommand {
        raw: raw.to_string(),
        argv,
    })
}

impl Cli {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Token source selected by the flags.
    pub fn token_source(&self) -> Box<dyn TokenSource> {
        if let Some(token) = &self.access_token {
            return Box::new(StaticToken::new(token.clone()));
        }
        match &self.token_command {
            Some(cmd) => Box::new(CommandTokenSource::new(cmd.argv.clone())),
            None => Box::new(CommandTokenSource::default()),
        }
    }

    /// Human-readable name of the token source, for logs.
    pub fn token_source_label(&self) -> String {
        if self.access_token.is_some() {
            return "static token".to_string();
        }
        match &self.token_command {
            Some(cmd) => cmd.raw.clone(),
            None => DEFAULT_TOKEN_COMMAND.join(" "),
        }
    }
}
