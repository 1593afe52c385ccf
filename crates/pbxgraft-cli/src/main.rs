use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod guidance;
mod output;
mod prompt;

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    output::init(cli.json);

    // Logs go to stderr so JSON on stdout stays clean for piping.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("warn,pbxgraft=info,pbxgraft_core=info,pbxgraft_store=info"),
        _ => EnvFilter::new("warn,pbxgraft=debug,pbxgraft_core=debug,pbxgraft_store=debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd::dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            let (code, hint) = cmd::classify(&err);
            tracing::debug!(error = ?err, code, "command failed");
            output::failure(&err, code, hint);
            ExitCode::from(code)
        }
    }
}
