//! tactic-report
//!
//! Fetches a player's analysed Lichess games and prints every missed tactic
//! as a JSON report.

use tactic_analyzer::clients::LichessClient;
use tactic_analyzer::{analyze_tactics, AnalyzerConfig, AnalyzerError};
use tracing::info;

const USAGE: &str = "usage: tactic-report <username> [--max N] [--full-lines]";

struct Args {
    username: String,
    max_games: Option<usize>,
    full_lines: bool,
}

fn parse_args() -> Result<Args, AnalyzerError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut username = None;
    let mut max_games = None;
    let mut full_lines = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--max" => {
                let value = args
                    .get(i + 1)
                    .and_then(|v| v.parse().ok())
                    .filter(|&n: &usize| n > 0)
                    .ok_or_else(|| AnalyzerError::Config(format!("--max needs a positive number\n{USAGE}")))?;
                max_games = Some(value);
                i += 1;
            }
            "--full-lines" => full_lines = true,
            arg if arg.starts_with("--") => {
                return Err(AnalyzerError::Config(format!("unknown flag {arg}\n{USAGE}")));
            }
            arg => username = Some(arg.to_string()),
        }
        i += 1;
    }

    let username = username.ok_or_else(|| AnalyzerError::Config(USAGE.to_string()))?;
    Ok(Args {
        username,
        max_games,
        full_lines,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    dotenvy::dotenv().ok();

    let args = parse_args()?;
    let mut config = AnalyzerConfig::from_env()?;
    if let Some(max) = args.max_games {
        config.max_games = max;
    }
    if args.full_lines {
        config.preview_plies = None;
    }

    info!(
        username = %args.username,
        max_games = config.max_games,
        base_url = %config.lichess_base_url,
        "Analyzing games"
    );

    let client = LichessClient::new(&config).map_err(AnalyzerError::from)?;
    let report = analyze_tactics(&client, &args.username, &config).await?;

    println!("{}", report.to_json()?);
    Ok(())
}
