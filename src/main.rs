//! fluxline CLI
//!
//! Command-line access to a database server:
//! - Check connectivity
//! - List, create and drop databases
//! - Show retention policies
//! - Run raw queries

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fluxline::config::{generate_default_config, Config, LoggingConfig};
use fluxline::domain::QueryResult;
use fluxline::FluxClient;

#[derive(Parser)]
#[command(name = "fluxline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for time-series databases speaking line protocol over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server URL, overriding the configuration
    #[arg(long, global = true)]
    url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers and show its version
    Ping,

    /// List databases
    Databases,

    /// Create a database
    CreateDatabase {
        name: String,
    },

    /// Drop a database
    DropDatabase {
        name: String,
    },

    /// List retention policies of a database
    Policies {
        /// Database (default: the configured database)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Run a raw query
    Query {
        /// Query text, e.g. 'SELECT * FROM "metrics".."cpu"'
        query: String,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.url {
        config.client.url = url.clone();
    }

    init_logging(&config.logging);

    if let Commands::InitConfig { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let client = FluxClient::connect(
        &config.client.url,
        Duration::from_millis(config.client.timeout_ms),
    )
    .await
    .with_context(|| format!("Could not connect to {}", config.client.url))?;

    match cli.command {
        Commands::Ping => {
            let server = client.server();
            let build = server
                .build_type
                .map(|b| b.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let version = server
                .version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(server)?);
            } else {
                println!("{} {} at {}", build, version, config.client.url);
            }
        }

        Commands::Databases => {
            let databases = client.databases().await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&databases)?);
            } else {
                for database in databases {
                    println!("{}", database);
                }
            }
        }

        Commands::CreateDatabase { name } => {
            client.create_database(&name).await?;
            println!("Created database '{}'", name);
        }

        Commands::DropDatabase { name } => {
            client.drop_database(&name).await?;
            println!("Dropped database '{}'", name);
        }

        Commands::Policies { database } => {
            let database = database
                .or(config.client.database.clone())
                .context("No database given; pass --database or set FLUXLINE_DATABASE")?;
            let policies = client.retention_policies(&database).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&policies)?);
            } else {
                println!(
                    "{:<20} {:>12} {:>12} {:>12} {:>8}",
                    "NAME", "DURATION", "SHARD", "REPLICATION", "DEFAULT"
                );
                for policy in policies {
                    println!(
                        "{:<20} {:>12} {:>12} {:>12} {:>8}",
                        policy.name(),
                        fluxline::codec::duration::format(policy.duration())?,
                        fluxline::codec::duration::format(policy.shard_duration())?,
                        policy.replication(),
                        policy.is_default()
                    );
                }
            }
        }

        Commands::Query { query } => {
            let response = client.api().batch_query(&query).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(response.results())?);
            } else {
                print_results(response.results());
            }
        }

        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("fluxline={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_results(results: &[QueryResult]) {
    for result in results {
        for series in result.series() {
            println!("name: {}", series.name());
            for point in series.points() {
                let time = point
                    .timestamp()
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                let tags: Vec<String> = point
                    .tags()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                let fields: Vec<String> = point
                    .fields()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                println!("  {}  {}  {}", time, tags.join(","), fields.join(","));
            }
            println!();
        }
    }
}
