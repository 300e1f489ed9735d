//! CLI module for the Staybook command-line interface.
//!
//! Without a subcommand the binary starts the GraphQL server. Other subcommands:
//! - `schema` - Print the GraphQL schema (SDL)
//! - `quote` - Price a stay offline
//! - `config check` - Validate configuration file
//! - `bookings complete` - Mark confirmed bookings past check-out as completed

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::validation::parse_instant;
use crate::config::Config;
use crate::engine::{complete_finished, nights_between, PricingPolicy};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "staybook")]
#[command(author, version, about = "Hotel search and booking service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "STAYBOOK_CONFIG", default_value = "staybook.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long, env = "STAYBOOK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the GraphQL server
    Serve,

    /// Print the GraphQL schema definition
    Schema,

    /// Price a stay with the configured surcharge and tax rate
    Quote(QuoteArgs),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Booking maintenance commands
    #[command(subcommand)]
    Bookings(BookingsCommands),
}

#[derive(clap::Args, Debug)]
pub struct QuoteArgs {
    /// Nightly room price
    #[arg(long)]
    pub price: f64,

    /// Guests included in the price
    #[arg(long, default_value = "2")]
    pub capacity: i64,

    #[arg(long, default_value = "1")]
    pub guests: i64,

    /// Number of nights; ignored when check-in and check-out are given
    #[arg(long, default_value = "1")]
    pub nights: i64,

    #[arg(long, requires = "check_out")]
    pub check_in: Option<String>,

    #[arg(long, requires = "check_in")]
    pub check_out: Option<String>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Bookings subcommands
#[derive(Subcommand, Debug)]
pub enum BookingsCommands {
    /// Complete confirmed bookings whose check-out has passed
    Complete,
}

/// Run a subcommand other than `serve`
pub async fn run_command(cli: &Cli, command: &Commands) -> Result<()> {
    match command {
        Commands::Serve => bail!("serve is handled by the server entry point"),
        Commands::Schema => {
            print!("{}", crate::api::graphql::sdl());
            Ok(())
        }
        Commands::Quote(args) => cmd_quote(cli, args),
        Commands::Config(ConfigCommands::Check) => cmd_config_check(cli),
        Commands::Bookings(BookingsCommands::Complete) => cmd_bookings_complete(cli).await,
    }
}

fn cmd_quote(cli: &Cli, args: &QuoteArgs) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let nights = stay_nights(args)?;
    if args.price < 0.0 {
        bail!("--price must not be negative");
    }
    if args.capacity < 1 || args.guests < 1 {
        bail!("--capacity and --guests must be at least 1");
    }

    let quote = PricingPolicy::from(&config.pricing).quote(args.price, args.capacity, args.guests, nights);
    println!("{}", quote.summary_text());
    Ok(())
}

fn stay_nights(args: &QuoteArgs) -> Result<i64> {
    match (&args.check_in, &args.check_out) {
        (Some(check_in), Some(check_out)) => {
            let check_in = parse_instant(check_in, "checkIn").map_err(anyhow::Error::msg)?;
            let check_out = parse_instant(check_out, "checkOut").map_err(anyhow::Error::msg)?;
            if check_out <= check_in {
                bail!("--check-out must be after --check-in");
            }
            Ok(nights_between(check_in, check_out))
        }
        _ if args.nights < 1 => bail!("--nights must be at least 1"),
        _ => Ok(args.nights),
    }
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    let config = Config::load(config_path)?;
    println!("[OK] Configuration file is valid!");
    println!();
    println!("Server:");
    println!("  Address:      {}:{}", config.server.host, config.server.port);
    println!("  Data Dir:     {}", config.server.data_dir.display());
    println!("  Environment:  {}", config.server.environment);
    println!();
    println!("Auth:");
    println!("  Token TTL:    {}h", config.auth.token_ttl_hours);
    println!(
        "  Admin Seed:   {}",
        config.auth.admin_email.as_deref().unwrap_or("(none)")
    );
    println!();
    println!("Pricing:");
    println!(
        "  Extra Guest:  {}{}",
        config.pricing.currency_symbol, config.pricing.extra_guest_fee
    );
    println!("  Tax Rate:     {}", config.pricing.tax_rate);
    println!();
    println!("Booking:");
    println!(
        "  Enforce Availability: {}",
        config.booking.enforce_availability
    );
    Ok(())
}

async fn cmd_bookings_complete(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let db = crate::db::init(&config.server.data_dir)
        .await
        .context("Failed to open database")?;

    let completed = complete_finished(&db, Utc::now()).await?;
    if completed.is_empty() {
        println!("No bookings to complete.");
    }
    for booking in &completed {
        println!("{}  {}  {}", booking.id, booking.check_out, booking.status);
    }
    Ok(())
}
