use std::fs::File;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dhcpd_leases::{Config, Lease, Result};

#[derive(Parser)]
#[command(name = "dhcpd-leases")]
#[command(author, version, about = "Inspect ISC dhcpd.leases files", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "dhcpd-leases.json")]
    config: PathBuf,

    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Leases file to read instead of the configured one.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Only leases that are active and not expired.
    #[arg(long)]
    active: bool,

    /// Only leases in this binding state (repeatable).
    #[arg(long = "state")]
    states: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Json,
    List,
    Render,
    ShowConfig,
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(file) = cli.file {
        config.leases_file = file;
    }
    if cli.active {
        config.active_only = true;
    }
    if !cli.states.is_empty() {
        config.binding_states = cli.states;
    }
    config.validate()?;

    match cli.command.unwrap_or(Commands::Json) {
        Commands::Json => {
            let leases = load_leases(&config)?;
            let output = if config.pretty {
                serde_json::to_string_pretty(&leases)?
            } else {
                serde_json::to_string(&leases)?
            };
            println!("{}", output);
            Ok(())
        }
        Commands::List => {
            let leases = load_leases(&config)?;

            if leases.is_empty() {
                println!("No leases.");
            } else {
                println!(
                    "{:<40} {:<18} {:<24} {:<10} {:<24}",
                    "IP Address", "MAC", "Hostname", "State", "Ends"
                );
                println!("{}", "-".repeat(120));

                for lease in leases {
                    let ends = lease
                        .ends
                        .map(|ends| ends.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_else(|| "never".to_string());
                    let mac = if lease.hardware.is_empty() {
                        "-"
                    } else {
                        lease.hardware.mac.as_str()
                    };

                    println!(
                        "{:<40} {:<18} {:<24} {:<10} {:<24}",
                        lease.ip.map(|ip| ip.to_string()).unwrap_or_default(),
                        mac,
                        lease.client_hostname.as_deref().unwrap_or_default(),
                        lease.binding_state.as_deref().unwrap_or_default(),
                        ends
                    );
                }
            }

            Ok(())
        }
        Commands::Render => {
            for lease in load_leases(&config)? {
                print!("{}", lease);
            }
            Ok(())
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::InitConfig => {
            config.save(&cli.config)?;
            info!("Wrote config to {:?}", cli.config);
            Ok(())
        }
    }
}

fn load_leases(config: &Config) -> Result<Vec<Lease>> {
    info!("Reading leases from {:?}", config.leases_file);
    let leases = dhcpd_leases::parse(File::open(&config.leases_file)?)?;

    let now = Utc::now();
    let total = leases.len();
    let leases: Vec<Lease> = leases
        .into_iter()
        .filter(|lease| config.matches(lease, now))
        .collect();
    info!("{} of {} lease(s) match filters", leases.len(), total);
    Ok(leases)
}
