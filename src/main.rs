//! relevance-ranking - Command line entry point

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use relevance_ranking::app::KeyTarget;
use relevance_ranking::config::Settings;
use relevance_ranking::services::OutputOrder;
use relevance_ranking::App;

#[derive(Parser, Debug)]
#[command(
    name = "relevance-ranking",
    version,
    about = "Rank journalists by relevance to a newsroom's press releases"
)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "RELEVANCE_RANKING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend journalists for a newsroom's press releases
    Rank {
        /// Case-insensitive substring of the newsroom name
        #[arg(long)]
        newsroom: String,

        /// Order results by relevance score instead of match order
        #[arg(long, default_value_t = false)]
        sort_by_score: bool,

        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List newsroom names in the document store
    Newsrooms,

    /// Load articles and press releases, then index article embeddings
    Seed {
        /// Article records (CSV with header row, or JSON array)
        #[arg(long)]
        articles: PathBuf,

        /// Press release records (CSV with header row, or JSON array)
        #[arg(long)]
        press_releases: PathBuf,
    },

    /// Create the configured serverless index and save its host
    InitIndex,

    /// Manage API keys in the OS keychain
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand, Debug)]
enum KeysAction {
    /// Store an API key read from stdin
    Set {
        #[arg(value_enum)]
        service: KeyService,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeyService {
    Pinecone,
    Openai,
}

impl From<KeyService> for KeyTarget {
    fn from(service: KeyService) -> Self {
        match service {
            KeyService::Pinecone => KeyTarget::Pinecone,
            KeyService::Openai => KeyTarget::OpenAi,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path().context("No configuration directory available")?,
    };
    let settings = Settings::load_from(&settings_path)?;
    let app = App::open(settings).await?;

    match cli.command {
        Command::Rank {
            newsroom,
            sort_by_score,
            json,
        } => {
            let order = sort_by_score.then_some(OutputOrder::ScoreDescending);
            let journalists = app.rank(&newsroom, order).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&journalists)?);
            } else if journalists.is_empty() {
                println!("No relevant journalists found.");
            } else {
                for journalist in &journalists {
                    println!(
                        "{} ({:.3})\n  {}\n",
                        journalist.email, journalist.relevance_score, journalist.motivation
                    );
                }
            }
        }
        Command::Newsrooms => {
            for newsroom in app.newsrooms().await? {
                println!("{}", newsroom);
            }
        }
        Command::Seed {
            articles,
            press_releases,
        } => {
            let report = app.seed(&articles, &press_releases).await?;
            println!(
                "Loaded {} articles and {} press releases; indexed {} articles.",
                report.articles_loaded, report.press_releases_loaded, report.articles_indexed
            );
        }
        Command::InitIndex => {
            let host = app.create_index().await?;
            let mut settings = app.settings().clone();
            settings.pinecone.index_host = Some(host.clone());
            settings.save_to(&settings_path)?;
            println!("Index host {} saved to {}", host, settings_path.display());
        }
        Command::Keys {
            action: KeysAction::Set { service },
        } => {
            let mut key = String::new();
            std::io::stdin()
                .read_to_string(&mut key)
                .context("Failed to read API key from stdin")?;
            app.store_api_key(service.into(), &key).await?;
            println!("Stored {:?} API key.", service);
        }
    }

    Ok(())
}
