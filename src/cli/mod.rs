//! Command line entry points
//!
//! - `serve`: run the HTTP API
//! - `search`: match a prompt against the use-case catalog
//! - `recommend`: pick the model best suited to a prompt
//! - `models`: browse the model pricing table

pub mod catalog;
pub mod serve;

use clap::{Args, Parser, Subcommand};

/// AI Cost Guardian - spend tracking and model guidance for AI providers
#[derive(Parser)]
#[command(name = "ai-cost-guardian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Find the use cases that best match a prompt
    Search(SearchArgs),

    /// Recommend a model for a prompt, with an estimated cost per request
    Recommend(RecommendArgs),

    /// List models with pricing, filtered and sorted
    Models(ModelsArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Prompt or task description to match
    pub query: String,

    /// Maximum number of matches to print
    #[arg(short, long, default_value_t = crate::domain::use_case::DEFAULT_LIMIT)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// Prompt or task description
    pub prompt: String,
}

#[derive(Args, Debug, Default)]
pub struct ModelsArgs {
    /// Provider id, e.g. openai or claude
    #[arg(long)]
    pub provider: Option<String>,

    /// Case-insensitive substring of the model or provider name
    #[arg(long)]
    pub search: Option<String>,

    /// Price bucket: budget, mid or premium
    #[arg(long)]
    pub price: Option<String>,

    /// Sort key: price, performance or context
    #[arg(long)]
    pub sort: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from(["ai-cost-guardian", "search", "write a regex", "-l", "3"])
            .unwrap();

        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "write a regex");
                assert_eq!(args.limit, 3);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_recommend() {
        let cli = Cli::try_parse_from(["ai-cost-guardian", "recommend", "summarize this email"])
            .unwrap();

        match cli.command {
            Command::Recommend(args) => assert_eq!(args.prompt, "summarize this email"),
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_parse_models() {
        let cli = Cli::try_parse_from([
            "ai-cost-guardian",
            "models",
            "--provider",
            "openai",
            "--sort",
            "price",
        ])
        .unwrap();

        match cli.command {
            Command::Models(args) => {
                assert_eq!(args.provider.as_deref(), Some("openai"));
                assert_eq!(args.sort.as_deref(), Some("price"));
                assert!(args.price.is_none());
            }
            _ => panic!("expected models"),
        }
    }
}
