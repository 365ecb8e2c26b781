//! Cruise console - manage cabins, the waiting list and expenses
//!
//! Every subcommand sends one request to `cruised` and prints the reply.
//!
//! # Usage
//!
//! ```text
//! cruise cabins
//! cruise assign 3 "Smith Family" -p Ann:Smith -p Tim:Smith:CHILD
//! cruise vacate 3
//! cruise find Smith
//! cruise total
//! cruise roster
//! cruise charge 3 0 12.50
//! cruise waitlist
//! cruise waitlist-add "Jones"
//! cruise export ship.json
//! cruise import ship.json
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cruise_cli::client::DEFAULT_SOCKET_PATH;
use cruise_cli::input::{parse_amount, parse_passenger};
use cruise_cli::{render, CliError, ClientConfig, DaemonClient};

// ============================================================================
// CLI Arguments
// ============================================================================

/// Cruise console - cabin registry client
#[derive(Parser, Debug)]
#[command(name = "cruise")]
#[command(about = "Manage cruise cabins, the waiting list and passenger expenses")]
#[command(version)]
struct Args {
    /// Daemon socket path
    #[arg(long, short = 's', global = true, env = "CRUISE_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Seconds to wait for the daemon
    #[arg(long, global = true, default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all twelve cabins
    Cabins,
    /// Assign a party to an empty cabin
    Assign {
        cabin: i64,
        /// Party name shown on the cabin
        name: String,
        /// Passenger as First:Surname[:ADULT|CHILD], repeatable (1-3)
        #[arg(long = "passenger", short = 'p', value_parser = parse_passenger_arg)]
        passengers: Vec<cruise_protocol::NewPassenger>,
    },
    /// Vacate a cabin and report who is next on the waiting list
    Vacate { cabin: i64 },
    /// Find cabins whose name contains the text
    Find { name: String },
    /// Show total expenses across the ship
    Total,
    /// List passengers sorted by surname, then first name
    Roster,
    /// Charge an amount to a passenger
    Charge {
        cabin: i64,
        /// Passenger position within the cabin, from 0
        passenger: usize,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Show the waiting list
    Waitlist,
    /// Add a guest to the waiting list (ship must be full)
    WaitlistAdd { name: String },
    /// Save all cabins to a JSON file
    Export { file: PathBuf },
    /// Replace all cabins from a JSON export
    Import { file: PathBuf },
}

fn parse_passenger_arg(arg: &str) -> std::result::Result<cruise_protocol::NewPassenger, String> {
    parse_passenger(arg).map_err(|e| e.to_string())
}

// ============================================================================
// Logging Setup
// ============================================================================

fn get_log_dir() -> Option<PathBuf> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg_state).join("cruise"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/state/cruise"))
}

fn create_log_file() -> Option<fs::File> {
    let log_dir = get_log_dir()?;
    fs::create_dir_all(&log_dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("console.log"))
        .ok()
}

fn init_logging() {
    if let Some(file) = create_log_file() {
        let filter = EnvFilter::from_default_env().add_directive(
            "cruise_cli=info"
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::Directive::from(tracing::Level::INFO)),
        );

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig {
        socket_path: args.socket,
        timeout: Duration::from_secs(args.timeout),
    };
    let mut client = DaemonClient::connect(&config).await?;
    debug!(command = ?args.command, "Running console command");

    match args.command {
        Command::Cabins => print!("{}", render::cabins(&client.list_cabins().await?)),
        Command::Assign {
            cabin,
            name,
            passengers,
        } => println!("{}", client.assign(cabin, &name, passengers).await?),
        Command::Vacate { cabin } => {
            let reply = client.vacate(cabin).await?;
            println!("{}", reply.message);
            if let Some(guest) = reply.next_waiting_guest {
                info!(cabin, guest = %guest, "Waiting-list guest popped");
                println!("Next guest: {guest}. Assign them with `cruise assign {cabin} \"{guest}\" -p First:Surname`.");
            }
        }
        Command::Find { name } => print!("{}", render::cabins(&client.find(&name).await?)),
        Command::Total => print!("{}", render::total(client.total().await?)),
        Command::Roster => print!("{}", render::roster(&client.roster().await?)),
        Command::Charge {
            cabin,
            passenger,
            amount,
        } => {
            let amount = parse_amount(&amount)?;
            println!("{}", client.charge(cabin, passenger, amount).await?);
        }
        Command::Waitlist => print!("{}", render::waiting_list(&client.waiting_list().await?)),
        Command::WaitlistAdd { name } => println!("{}", client.add_to_waiting_list(&name).await?),
        Command::Export { file } => {
            let cabins = client.list_cabins().await?;
            let json = serde_json::to_string_pretty(&cabins)?;
            fs::write(&file, json).map_err(|source| CliError::File {
                path: file.clone(),
                source,
            })?;
            println!("Exported {} cabins to {}.", cabins.len(), file.display());
        }
        Command::Import { file } => {
            let text = fs::read_to_string(&file).map_err(|source| CliError::File {
                path: file.clone(),
                source,
            })?;
            let cabins: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            println!("{}", client.load_cabins(cabins).await?);
        }
    }

    client.disconnect().await?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(e) = run(args).await {
        // Registry rejections are printed exactly as the daemon worded them
        match e.downcast_ref::<CliError>() {
            Some(CliError::Daemon { message, .. }) => eprintln!("{message}"),
            _ => eprintln!("Error: {e:#}"),
        }
        process::exit(1);
    }
}
