use crate::report::{
    run_batch, run_ruleset_export, run_score, BatchArgs, RulesetExportArgs, ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use uhfs::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UHFS Scoring Service",
    about = "Compute and serve household financial-health scores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one user's answers from a JSON file
    Score(ScoreArgs),
    /// Score every row of a questionnaire export CSV
    Batch(BatchArgs),
    /// Inspect scoring rulesets
    Ruleset {
        #[command(subcommand)]
        command: RulesetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesetCommand {
    /// Write the active ruleset as JSON, ready to edit and load via APP_RULESET_PATH
    Export(RulesetExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Batch(args) => run_batch(args),
        Command::Ruleset {
            command: RulesetCommand::Export(args),
        } => run_ruleset_export(args),
    }
}
