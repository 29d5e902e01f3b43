pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "sip")]
#[command(about = "SIP CLI - create plans and read summaries from a SIP Tracker server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "SIP_API_URL",
        default_value = "http://127.0.0.1:8000",
        help = "Server base URL"
    )]
    pub url: String,

    #[arg(long, global = true, env = "SIP_TOKEN", hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a development bearer token")]
    Token(commands::token::TokenArgs),

    #[command(about = "Create a SIP plan")]
    Create(commands::sips::CreateArgs),

    #[command(about = "Show per-scheme investment summary")]
    Summary(commands::sips::SummaryArgs),

    #[command(about = "Check server health")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.url, cli.token.clone())?;

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Create(args) => commands::sips::create(&client, args, output_format).await,
        Commands::Summary(args) => commands::sips::summary(&client, args, output_format).await,
        Commands::Health => commands::sips::health(&client, output_format).await,
    }
}
