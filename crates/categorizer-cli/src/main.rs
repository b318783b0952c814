use std::io::{self, BufRead};

use clap::Parser;
use expense_categorizer::{CategorizerConfig, ExpenseCategorizer};

#[derive(Parser)]
#[command(name = "categorizer-cli")]
#[command(about = "Categorize expense descriptions with a hosted model")]
#[command(version)]
struct Cli {
    /// Completion endpoint base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Expense descriptions; read from stdin (one per line) when absent
    descriptions: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = CategorizerConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }

    let descriptions = if cli.descriptions.is_empty() {
        read_stdin_descriptions()?
    } else {
        cli.descriptions
    };

    let categorizer = ExpenseCategorizer::new(config);
    let categories = categorizer.categorize(&descriptions).await;

    for (description, category) in descriptions.iter().zip(categories) {
        println!("{description}\t{category}");
    }

    Ok(())
}

fn read_stdin_descriptions() -> io::Result<Vec<String>> {
    let mut descriptions = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            descriptions.push(trimmed.to_string());
        }
    }
    Ok(descriptions)
}
