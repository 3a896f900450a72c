// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, run the pipeline.
// - Everything the pipeline reports goes to stdout; logs go to stderr.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use deploy_rules::{
    api::ApiClient,
    config::Cli,
    deploy::{self, Deployment},
    ui, Result,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(cli.debug)
        .init();

    info!(
        project = %cli.project,
        rules = %cli.rules.display(),
        tokens = %cli.token_source_label(),
        "starting deployment"
    );

    let result = run(&cli);
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let status = ui::report(&result, &mut stdout.lock(), color)?;
    Ok(ExitCode::from(status))
}

fn run(cli: &Cli) -> Result<deploy::Outcome> {
    let client = ApiClient::new(&cli.endpoint, cli.timeout())?;
    let tokens = cli.token_source();
    let deployment = Deployment {
        project_id: &cli.project,
        rules_path: &cli.rules,
        dry_run: cli.dry_run,
    };

    let confirm_enabled = cli.confirm;
    let mut spinner = None;
    let mut confirm = |url: &str| -> Result<bool> {
        if confirm_enabled && !ui::confirm_send(url)? {
            return Ok(false);
        }
        spinner = Some(ui::spinner("Deploying Firestore rules..."));
        Ok(true)
    };

    let result = deploy::run(&deployment, tokens.as_ref(), &client, &mut confirm);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}
