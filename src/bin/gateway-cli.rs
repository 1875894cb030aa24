use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Query a running Aptos gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:5000", env = "GATEWAY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Health,
    /// Show the APT balance of an address
    Balance { address: String },
    /// List transactions sent by an address
    Transactions {
        address: String,
        #[arg(long)]
        limit: Option<u16>,
        #[arg(long)]
        start: Option<u64>,
    },
    /// Show sequence number and authentication key of an address
    Account { address: String },
    /// Check whether an address is on the admin allow-list
    Admin { address: String },
    /// Show the role and permissions of an address
    Profile { address: String },
}

impl Commands {
    fn path(&self) -> String {
        match self {
            Commands::Health => "/api/health".to_string(),
            Commands::Balance { address } => format!("/api/aptos/balance/{address}"),
            Commands::Transactions { address, .. } => format!("/api/aptos/transactions/{address}"),
            Commands::Account { address } => format!("/api/aptos/account/{address}"),
            Commands::Admin { address } => format!("/api/aptos/admin/{address}"),
            Commands::Profile { address } => format!("/api/auth/profile/{address}"),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Commands::Transactions { limit, start, .. } = self {
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(start) = start {
                query.push(("start", start.to_string()));
            }
        }
        query
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    let res = client.get(url).query(&cli.command.query()).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
    Ok(())
}
