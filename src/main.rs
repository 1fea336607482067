//! `inlinesync-replay`: replays a recorded editing session against a headless
//! inline editor and prints the resulting buffer and range.

use anyhow::Context;
use clap::Parser;
use inlinesync::{load_script, run_script, SyncConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "inlinesync-replay",
    about = "Replay native editing events against a headless inline editor",
    version
)]
struct Cli {
    /// Path to the JSON replay script
    script: PathBuf,

    /// Output the report in JSON format
    #[arg(short, long)]
    json: bool,

    /// Override the script's user agent (e.g. an Android WebView string)
    #[arg(long)]
    user_agent: Option<String>,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("inlinesync=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut script = load_script(&cli.script)
        .with_context(|| format!("loading {}", cli.script.display()))?;
    if let Some(user_agent) = cli.user_agent {
        script.user_agent = Some(user_agent);
    }

    let report = run_script(&script, SyncConfig::from_env())?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("replay error: {:#}", err);
            1
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    std::process::exit(run_and_report(|| run(cli)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_and_report_returns_zero_on_success() {
        assert_eq!(run_and_report(|| Ok::<(), &str>(())), 0);
    }

    #[test]
    fn run_and_report_returns_non_zero_on_failure() {
        assert_eq!(run_and_report(|| Err::<(), &str>("boom")), 1);
    }
}
