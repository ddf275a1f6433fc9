use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stressmate::{client, config, server, ModelKind};

#[derive(Parser)]
#[command(name = "stressmate", version, about = "StressMate ML inference service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the models and serve the HTTP API (default)
    Serve(ServeArgs),
    /// Check whether the service is answering
    Status {
        #[arg(long, env = "ML_SERVICE_URL", default_value = client::DEFAULT_URL)]
        url: String,
    },
    /// Send a feature vector to a running service
    Predict {
        /// Model to query
        #[arg(value_enum)]
        model: ModelKind,

        /// Comma-separated feature values, e.g. 0.1,0.2,0.3
        #[arg(long, allow_hyphen_values = true)]
        features: String,

        #[arg(long, env = "ML_SERVICE_URL", default_value = client::DEFAULT_URL)]
        url: String,
    },
}

#[derive(clap::Args, Default)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Classifier artifact path
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// Regressor artifact path
    #[arg(long)]
    regressor: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(args)) => serve(cli.config, args),
        None => serve(cli.config, ServeArgs::default()),
        Some(Command::Status { url }) => status(&url),
        Some(Command::Predict {
            model,
            features,
            url,
        }) => predict(&url, model, &features),
    }
}

fn serve(config_path: Option<PathBuf>, args: ServeArgs) -> Result<()> {
    let mut config = config::load_config(config_path.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = args.classifier {
        config.classifier_path = path;
    }
    if let Some(path) = args.regressor {
        config.regressor_path = path;
    }
    server::run_server(&config)
}

fn status(url: &str) -> Result<()> {
    match client::health(url) {
        Ok(response) if response.is_success() => {
            eprintln!("stressmate: running at {}", url);
            println!("{}", response.body);
        }
        Ok(response) => eprintln!("stressmate: {} answered with status {}", url, response.status),
        Err(e) => eprintln!("stressmate: not responding ({:#})", e),
    }
    Ok(())
}

fn predict(url: &str, model: ModelKind, features: &str) -> Result<()> {
    let features = client::parse_features(features)?;
    let response = client::predict(url, model, &features)?;
    println!("{}", response.body);
    if !response.is_success() {
        anyhow::bail!("{} prediction failed with status {}", model, response.status);
    }
    Ok(())
}
