use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::utils::format_ether;
use alloy::signers::local::PrivateKeySigner;
use clap::Args;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use mintgate_lib::{SessionOrchestrator, Snapshot};

use crate::chain::RpcWallet;
use crate::{load_config, resolve_private_key};

/// Show collection and session status for the connected account
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// RPC provider URL
    #[arg(
        long,
        short = 'r',
        default_value = "https://ethereum-rpc.publicnode.com"
    )]
    pub provider_url: String,

    /// Private key for the session account (will prompt if not provided)
    #[arg(long, short = 'p')]
    pub priv_key: Option<String>,

    /// Path to a collection configuration JSON file
    #[arg(long, short = 'c')]
    pub config: Option<String>,
}

impl StatusCommand {
    pub async fn execute(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", "Collection Status".bright_magenta().bold());
        println!("{}", "═".repeat(50).bright_black());
        println!();

        let config = load_config(self.config.as_deref())?;
        let key = resolve_private_key(self.priv_key.as_deref())?;
        let signer: PrivateKeySigner = key.trim().parse()?;

        let spinner = sync_spinner("Connecting to provider...");
        let wallet = Arc::new(RpcWallet::connect(&self.provider_url, signer).await?);
        let orchestrator = SessionOrchestrator::new(config);
        orchestrator.discover(Some(wallet));

        spinner.set_message("Synchronizing session...");
        let snapshot = orchestrator.connect().await;
        spinner.finish_and_clear();

        print_snapshot(&orchestrator, &snapshot);
        Ok(())
    }
}

pub(crate) fn sync_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub(crate) fn print_snapshot(orchestrator: &SessionOrchestrator, snapshot: &Snapshot) {
    if let Some(notice) = &snapshot.last_error {
        println!("{} {}", "!".bright_red().bold(), notice.text().bright_red());
        return;
    }

    let config = orchestrator.config();
    let mainnet = snapshot.active_network.chain_id == config.mainnet.chain_id;

    println!(
        "{}  {} ({})",
        "Collection:".bright_black(),
        config.token_name.bright_white().bold(),
        config.token_symbol
    );
    println!(
        "{}  {}",
        "Network:   ".bright_black(),
        snapshot.active_network.name.bright_cyan()
    );
    if let Some(address) = snapshot.connected_address {
        println!("{}  {}", "Account:   ".bright_black(), address);
    }
    println!(
        "{}  {} / {}",
        "Supply:    ".bright_black(),
        snapshot.supply.total_supply,
        snapshot.supply.max_supply
    );
    println!(
        "{}  {} ETH (max {} per tx)",
        "Price:     ".bright_black(),
        format_ether(snapshot.price),
        snapshot.supply.max_per_tx
    );

    let phase = if snapshot.flags.paused {
        "paused".bright_yellow()
    } else if snapshot.flags.whitelist_phase {
        "whitelist sale".bright_cyan()
    } else {
        "public sale".bright_green()
    };
    println!("{}  {}", "Phase:     ".bright_black(), phase);

    if snapshot.flags.whitelist_phase {
        let eligibility = if snapshot.caller_whitelisted {
            "whitelisted".bright_green()
        } else {
            "not whitelisted".bright_yellow()
        };
        println!("{}  {}", "Account is:".bright_black(), eligibility);
    }
    if snapshot.sold_out() {
        println!();
        println!("{}", "Tokens have been sold out!".bright_yellow().bold());
    }

    println!();
    println!(
        "{}  {}",
        "Contract:  ".bright_black(),
        config.contract_url(&snapshot.active_network)
    );
    println!(
        "{}  {}",
        "Listing:   ".bright_black(),
        config.marketplace_url(mainnet)
    );
}
