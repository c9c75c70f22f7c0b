use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "bookstore-cli")]
#[command(about = "Command-line client for the bookstore API", long_about = None)]
struct Cli {
    /// Service URL, including any deployment base path.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// List the catalog
    Books,
    /// List featured books
    Featured,
    /// Show a single book
    Book {
        /// Book id
        id: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match cli.command {
        Commands::Health => "/health".to_string(),
        Commands::Books => "/livros".to_string(),
        Commands::Featured => "/livros/destaques".to_string(),
        Commands::Book { id } => format!("/livros/{id}"),
    };

    let res = client.get(format!("{base}{path}")).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(format!("{status}: {}", error_message(&body)).into());
    }

    let json: Value = serde_json::from_str(&body)?;
    println!("{}", serde_json::to_string_pretty(&json["data"])?);
    Ok(())
}

/// The envelope's `message`, or the raw body when it is not an envelope.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json["message"].as_str() {
            Some(message) => message.to_string(),
            None => json.to_string(),
        },
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
