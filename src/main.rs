//! Warden - guarded iteration controller for untrusted coding agents.
//!
//! Thin CLI entry point: preflight checks, collaborator wiring, and the
//! translation of typed run outcomes into process exit codes. All loop
//! and validation logic lives in the library.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use warden::agent::CommandAgent;
use warden::config::RunConfig;
use warden::error::WardenError;
use warden::r#loop::{Controller, RunOutcome};
use warden::tester::CommandTestRunner;
use warden::vcs::GitVcs;

#[derive(Parser)]
#[command(name = "warden")]
#[command(version = "0.1.0")]
#[command(about = "Supervised autonomous story execution with append-only memory guarantees", long_about = None)]
struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Exit code for a run that exhausted its retry budget.
///
/// Exhaustion is a failed run and must be observable as one, distinct
/// from both success and structural violations.
const EXIT_EXHAUSTED: i32 = 3;

/// Exit code for a commit refused after an otherwise valid attempt.
const EXIT_COMMIT_FAILED: i32 = 4;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "warden=debug,info"
    } else {
        "warden=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    if which::which("git").is_err() {
        let err = WardenError::MissingTool { tool: "git".into() };
        eprintln!("{} {}", "Error:".red().bold(), err);
        return err.exit_code();
    }

    let project_dir = match cli.project.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            eprintln!(
                "{} cannot resolve project directory {}: {e}",
                "Error:".red().bold(),
                cli.project.display()
            );
            return 1;
        }
    };

    let config = match RunConfig::load(&project_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            return err.exit_code();
        }
    };

    let controller = Controller::new(
        config.clone(),
        &project_dir,
        GitVcs::new(&project_dir),
        CommandAgent::new(config.agent_command.clone(), &project_dir),
        CommandTestRunner::new(config.test_command.clone(), &project_dir),
    );

    match controller.run().await {
        Ok(RunOutcome::AllComplete) => {
            println!("{} all stories complete", "Success:".green().bold());
            0
        }
        Ok(RunOutcome::Exhausted) => {
            eprintln!(
                "{} retry budget exhausted without completing a story",
                "Failed:".red().bold()
            );
            EXIT_EXHAUSTED
        }
        Ok(RunOutcome::Aborted(violation)) => {
            let err = WardenError::from(violation);
            eprintln!(
                "{} {} (working tree rolled back)",
                "Aborted:".red().bold(),
                err
            );
            err.exit_code()
        }
        Ok(RunOutcome::CommitFailed { story_id }) => {
            eprintln!(
                "{} commit refused after valid completion of {story_id}",
                "Failed:".red().bold()
            );
            EXIT_COMMIT_FAILED
        }
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            err.exit_code()
        }
    }
}
