use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "smartlogctl")]
#[command(about = "Management CLI for the SmartLog verbosity controller", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current level, configuration and last decision
    Status,
    /// Show windowed counts and buffer health
    Metrics,
    /// List accepted level names
    Levels,
    /// Override the level for a limited time
    SetLevel {
        /// Level name (Verbose, Debug, Information, Warning, Error, Fatal)
        level: String,

        /// Minutes until the override expires
        #[arg(short, long, default_value_t = 30)]
        minutes: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/api/smart-logs", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/status")).send().await?,
        Commands::Metrics => client.get(format!("{base}/metrics")).send().await?,
        Commands::Levels => client.get(format!("{base}/levels")).send().await?,
        Commands::SetLevel { level, minutes } => {
            client
                .post(format!("{base}/level"))
                .json(&json!({
                    "level": level,
                    "time_expiration_in_minute": minutes,
                }))
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
