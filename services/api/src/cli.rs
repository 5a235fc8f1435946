use crate::commands::{run_catalog, run_recommend, run_train, RecommendArgs, TrainArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dept_advisor::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Department Advisor",
    about = "Recommend university departments from student transcripts and profiles",
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
    /// Score one profile document and print the ranked recommendations
    Recommend(RecommendArgs),
    /// Fit the department classifier on synthetic data and persist its artifacts
    Train(TrainArgs),
    /// List the departments in the built-in catalog
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) scoring: ScoringArgs,
}

/// Scoring overrides shared by `serve` and `recommend`.
#[derive(Args, Debug, Default)]
pub(crate) struct ScoringArgs {
    /// Directory holding the fitted model artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
    /// Skip the fitted model and always use heuristic scoring
    #[arg(long)]
    pub(crate) heuristic_only: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::Train(args) => run_train(args),
        Command::Catalog => run_catalog(),
    }
}
