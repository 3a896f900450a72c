// Library root
// -----------
// The binary (`main.rs`) parses flags and wires these modules together; the
// pipeline itself lives here so it can be tested without a network.
//
// Module responsibilities:
// - `rules`: reads and JSON-checks the rules file, builds the release payload.
// - `credentials`: obtains the bearer token (gcloud helper or static token).
// - `api`: blocking HTTP client for the Firebase Rules API.
// - `deploy`: the fail-fast pipeline tying the three together.
// - `ui`: prints the outcome, spinner and confirmation prompt.
// - `config`: command-line and environment configuration.
pub mod api;
pub mod config;
pub mod credentials;
pub mod deploy;
pub mod error;
pub mod rules;
pub mod ui;

pub use error::{DeployError, Result};
