use std::process::ExitCode;

use clap::Parser;
use jira_toggl::{Cli, SyncError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match jira_toggl::run(cli).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!("error: {} issues failed to sync", summary.failures.len());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, SyncError::Config(_)) {
                eprintln!("\nFor more information, try '--help'.");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
