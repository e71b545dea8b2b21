use crate::assess::{run_assess, run_encode, AssessArgs, EncodeArgs};
use crate::prefs::{run_prefs, PrefsCommand};
use crate::report::{run_report, ReportArgs};
use clap::{Parser, Subcommand};
use hospitalization_predictor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "COVID hospitalization predictor",
    about = "Validate assessments, request hospitalization predictions and report disagreements",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an assessment form and request a prediction
    Assess(AssessArgs),
    /// Print the observation bundle for an assessment without sending it
    Encode(EncodeArgs),
    /// Report disagreement with a prediction to the medical team
    Report(ReportArgs),
    /// Read or change saved display preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Assess(args) => run_assess(args).await,
        Command::Encode(args) => run_encode(args),
        Command::Report(args) => run_report(args).await,
        Command::Prefs { command } => run_prefs(command),
    }
}
