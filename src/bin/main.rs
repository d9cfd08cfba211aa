//! vote-tally CLI

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};
use vote_tally::client::ScoreSource;
use vote_tally::{HttpScoreSource, Result, Scores, TallyConfig, Team};

#[derive(Parser)]
#[command(name = "vote-tally")]
#[command(about = "Live two-team vote tally with combo effects")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scores API base URL (the endpoint is <URL>/scores)
    #[arg(long, global = true, env = "VOTE_TALLY_API")]
    api: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, global = true, env = "VOTE_TALLY_POLL_MS")]
    poll_ms: Option<u64>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live dashboard (default)
    Watch {
        /// Print one line per event instead of drawing the dashboard
        #[arg(long)]
        plain: bool,
    },
    /// Fetch the scores once and print them
    Fetch {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Votes")]
    votes: u64,
    #[tabled(rename = "Share")]
    share: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        api,
        poll_ms,
        log_file,
        command,
    } = Cli::parse();

    let command = command.unwrap_or(Commands::Watch { plain: false });
    let dashboard = matches!(command, Commands::Watch { plain: false });
    init_logging(log_file.as_deref(), !dashboard)?;

    let config = load_config(config.as_deref(), api, poll_ms)?;

    match command {
        Commands::Watch { plain } => {
            let source: Arc<dyn ScoreSource> = Arc::new(HttpScoreSource::new(&config)?);
            tracing::info!(url = %config.scores_url(), plain, "Watching scores");
            if plain {
                vote_tally::headless::run_headless(config, source).await?;
            } else {
                vote_tally::tui::run_dashboard(config, source).await?;
            }
        }
        Commands::Fetch { json } => cmd_fetch(&config, json).await?,
        Commands::Config => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| vote_tally::Error::Other(e.to_string()))?;
            print!("{}", text);
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vote_tally=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // The dashboard owns the screen; stray log lines would corrupt it.
        None if !to_stderr => builder.with_writer(std::io::sink).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>, api: Option<String>, poll_ms: Option<u64>) -> Result<TallyConfig> {
    let mut config = match path {
        Some(path) => TallyConfig::from_file(path)?,
        None => TallyConfig::default(),
    };
    if let Some(api) = api {
        config.api_base_url = api;
    }
    if let Some(ms) = poll_ms {
        config.poll_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_fetch(config: &TallyConfig, json: bool) -> Result<()> {
    let source = HttpScoreSource::new(config)?;
    let scores: Scores = source.fetch().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    let labels = [&config.team1_label, &config.team2_label];
    let rows: Vec<ScoreRow> = Team::ALL
        .into_iter()
        .map(|team| ScoreRow {
            team: labels[team.index()].clone(),
            votes: scores.get(team),
            share: format!("{:.1}%", scores.percentage(team)),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Total votes: {}", scores.total());
    Ok(())
}
