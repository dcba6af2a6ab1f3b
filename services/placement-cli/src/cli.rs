use crate::commands::{run_bulk_approvals, run_score, BulkApprovalArgs, ScoreArgs};
use crate::demo::{run_demo, DemoArgs};
use clap::{Parser, Subcommand};
use placement_engine::config::AppConfig;
use placement_engine::error::AppError;
use placement_engine::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Placement Engine",
    about = "Drive application and onboarding workflows and score candidates from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an end-to-end demo of applications, scoring, and bulk approvals (default command)
    Demo(DemoArgs),
    /// Score a candidate profile against a job posting, both read from JSON files
    Score(ScoreArgs),
    /// Onboarding approval tools
    Approvals {
        #[command(subcommand)]
        command: ApprovalsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ApprovalsCommand {
    /// Apply one decision to every record in an approvals CSV export
    Bulk(BulkApprovalArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(args, &config),
        Command::Score(args) => run_score(args),
        Command::Approvals {
            command: ApprovalsCommand::Bulk(args),
        } => run_bulk_approvals(args, &config),
    }
}
