//! Command-line front end for the HP 8131A driver.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hp8131a::config::{DriverConfig, DEFAULT_CONFIG_PATH};
use hp8131a::parameter::descriptors;
use hp8131a::{Hp8131a, RawValue};

#[derive(Parser)]
#[command(name = "hp8131a", about = "Control an HP 8131A pulse generator", version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the simulated instrument regardless of configuration
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one parameter
    Get { name: String },
    /// Write one parameter
    Set { name: String, value: String },
    /// Fire a single manual trigger
    Trigger,
    /// List registered parameters
    List,
    /// Read every parameter
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.simulate {
        DriverConfig::load_simulated(&cli.config)
    } else {
        DriverConfig::load_from(&cli.config)
    }
    .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.application.log_level.as_str()),
    )
    .init();

    if let Command::List = cli.command {
        for d in descriptors() {
            println!("{:<20} {:<18} {}", d.name, d.command, d.domain);
        }
        return Ok(());
    }

    let mut pulser = Hp8131a::connect(&config.device)
        .with_context(|| format!("Failed to connect to HP 8131A on {}", config.device.address))?;

    match cli.command {
        Command::Get { name } => {
            let value = pulser
                .read_parameter(&name)
                .with_context(|| format!("Failed to read '{}'", name))?;
            println!("{}", value);
        }
        Command::Set { name, value } => {
            pulser
                .write_parameter(&name, RawValue::parse_arg(&value))
                .with_context(|| format!("Failed to set '{}' to '{}'", name, value))?;
        }
        Command::Trigger => pulser.manual_trigger().context("Manual trigger failed")?,
        Command::Status { json } => {
            let values = pulser.read_all().context("Failed to read instrument state")?;
            if json {
                let mut map = serde_json::Map::new();
                for (name, value) in &values {
                    map.insert(name.to_string(), serde_json::to_value(value)?);
                }
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for (name, value) in values {
                    println!("{:<20} {}", name, value);
                }
            }
        }
        Command::List => {}
    }

    Ok(())
}
