//! The deployment pipeline: load, validate, authenticate, send.
//!
//! Each step short-circuits the rest on failure, so a bad rules file never
//! reaches the credential helper and a credential failure never reaches the
//! network.

use std::path::Path;

use tracing::info;

use crate::api::{Release, ReleaseTransport};
use crate::credentials::TokenSource;
use crate::error::{DeployError, Result};
use crate::rules::{DeploymentRequest, RulesDocument};

/// Result of a successful run.
#[derive(Debug)]
pub enum Outcome {
    /// The release was created.
    Deployed(Release),
    /// Nothing was sent; the request that would have been.
    DryRun { url: String, request: DeploymentRequest },
}

/// Inputs of one run, borrowed from the resolved configuration.
pub struct Deployment<'a> {
    pub project_id: &'a str,
    pub rules_path: &'a Path,
    pub dry_run: bool,
}

/// Run the pipeline. `confirm` is asked right before the network call and
/// may veto it.
pub fn run(
    deployment: &Deployment<'_>,
    tokens: &dyn TokenSource,
    transport: &dyn ReleaseTransport,
    confirm: &mut dyn FnMut(&str) -> Result<bool>,
) -> Result<Outcome> {
    let rules = RulesDocument::load(deployment.rules_path)?;
    info!(
        rules = %rules.path().display(),
        bytes = rules.content().len(),
        "rules validated"
    );
    let request = DeploymentRequest::new(deployment.project_id, &rules);
    let url = transport.release_url(deployment.project_id);

    if deployment.dry_run {
        info!(%url, "dry run, not sending");
        return Ok(Outcome::DryRun { url, request });
    }

    let token = tokens.access_token()?;

    if !confirm(&url)? {
        return Err(DeployError::Cancelled);
    }

    let release = transport.create_release(&request, &token)?;
    info!(
        release = ?release.name,
        ruleset = ?release.ruleset_name,
        created = ?release.create_time,
        updated = ?release.update_time,
        "release created"
    );
    Ok(Outcome::Deployed(release))
}
