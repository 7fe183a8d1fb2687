//! Mintgate CLI - terminal client for the collection minting session
//!
//! Usage:
//! ```shell
//! # Show collection and session status
//! cargo run --bin mintgate -- status --priv-key $PRIVATE_KEY
//!
//! # Mint during the public sale
//! cargo run --bin mintgate -- mint --amount 2 --priv-key $PRIVATE_KEY
//!
//! # Mint with a whitelist membership proof
//! cargo run --bin mintgate -- mint --whitelist --amount 1 --priv-key $PRIVATE_KEY
//!
//! # Export a whitelist proof for any address
//! cargo run --bin mintgate -- proof --address 0x...
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use console::Term;
use std::process;

use mintgate_script::commands::{MintCommand, ProofCommand, StatusCommand};

#[derive(Parser)]
#[command(
    name = "mintgate",
    about = "Terminal client for the collection minting session",
    version = "0.1.0"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show collection and session status
    Status(StatusCommand),
    /// Mint tokens (public sale, or whitelist with --whitelist)
    Mint(MintCommand),
    /// Export a whitelist Merkle proof
    Proof(ProofCommand),
}

fn print_banner() {
    let term = Term::stdout();
    let _ = term.clear_screen();

    println!("{}", "MINTGATE".bright_green().bold());
    println!(
        "{}",
        "Collection minting sessions from the terminal".bright_cyan()
    );
    println!("{}", "═".repeat(50).bright_black());
    println!();
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);
    print_banner();

    let result = match cli.command {
        Commands::Status(status_cmd) => status_cmd.execute().await,
        Commands::Mint(mint_cmd) => mint_cmd.execute().await,
        Commands::Proof(proof_cmd) => proof_cmd.execute().await,
    };

    if let Err(e) = result {
        println!();
        eprintln!("{}", "Operation failed!".bright_red().bold());
        eprintln!("   {}", e.to_string().bright_red());
        println!();
        eprintln!("{}", "Tips:".bright_blue().bold());
        eprintln!("   • Check your private key format (should start with 0x)");
        eprintln!("   • Ensure your RPC provider is accessible");
        eprintln!("   • Verify the configuration file points at the deployed contract");
        process::exit(1);
    }
}
