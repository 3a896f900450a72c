// UI layer: turns the pipeline outcome into printed lines and an exit
// code, and owns the optional confirmation prompt and progress spinner.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::deploy::Outcome;
use crate::error::{DeployError, Result};

/// Print `result` to `out` and return the process exit status.
pub fn report(result: &Result<Outcome>, out: &mut dyn Write, color: bool) -> io::Result<u8> {
    match result {
        Ok(Outcome::Deployed(release)) => {
            let headline = "✅ Firestore rules deployed successfully!";
            if color {
                writeln!(out, "{}", headline.green())?;
            } else {
                writeln!(out, "{headline}")?;
            }
            writeln!(out, "Release: {}", release.name.as_deref().unwrap_or("<unknown>"))?;
            if let Some(ruleset) = &release.ruleset_name {
                writeln!(out, "Ruleset: {ruleset}")?;
            }
            Ok(0)
        }
        Ok(Outcome::DryRun { url, request }) => {
            writeln!(out, "Dry run: would POST to {url}")?;
            let body = serde_json::to_string_pretty(&request.payload)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(out, "{body}")?;
            Ok(0)
        }
        Err(err) => {
            if color {
                writeln!(out, "{}", err.to_string().red())?;
            } else {
                writeln!(out, "{err}")?;
            }
            Ok(1)
        }
    }
}

/// Ask before sending. Refuses when stdin is not a terminal.
pub fn confirm_send(url: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Err(DeployError::Prompt(
            "--confirm needs an interactive terminal".to_string(),
        ));
    }
    Confirm::new()
        .with_prompt(format!("Create a new rules release at {url}?"))
        .default(false)
        .interact()
        .map_err(|e| DeployError::Prompt(format!("confirmation prompt failed: {e}")))
}

/// Spinner on stderr while the request is in flight; hidden when stderr is
/// not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
