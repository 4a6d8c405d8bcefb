use ai_cost_guardian::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Search(args) => cli::catalog::run_search(args),
        Command::Recommend(args) => cli::catalog::run_recommend(args),
        Command::Models(args) => cli::catalog::run_models(args),
    }
}
