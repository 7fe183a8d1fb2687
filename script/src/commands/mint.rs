use std::sync::Arc;

use alloy::primitives::utils::format_ether;
use alloy::signers::local::PrivateKeySigner;
use clap::Args;
use colored::*;
use dialoguer::{Confirm, Input};

use mintgate_lib::SessionOrchestrator;

use crate::chain::RpcWallet;
use crate::commands::status::{print_snapshot, sync_spinner};
use crate::{load_config, resolve_private_key};

/// Mint tokens from the collection contract
#[derive(Args, Debug)]
pub struct MintCommand {
    /// Number of tokens to mint
    #[arg(long, short = 'a')]
    pub amount: Option<u64>,

    /// Use the whitelist mint entry point with a membership proof
    #[arg(long, short = 'w')]
    pub whitelist: bool,

    /// RPC provider URL
    #[arg(
        long,
        short = 'r',
        default_value = "https://ethereum-rpc.publicnode.com"
    )]
    pub provider_url: String,

    /// Private key for the minting account (will prompt if not provided)
    #[arg(long, short = 'p')]
    pub priv_key: Option<String>,

    /// Path to a collection configuration JSON file
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl MintCommand {
    pub async fn execute(&self) -> Result<(), Box<dyn std::error::Error>> {
        let title = if self.whitelist {
            "Whitelist Mint"
        } else {
            "Public Mint"
        };
        println!("{}", title.bright_magenta().bold());
        println!("{}", "═".repeat(50).bright_black());
        println!();

        let config = load_config(self.config.as_deref())?;
        let key = resolve_private_key(self.priv_key.as_deref())?;
        let signer: PrivateKeySigner = key.trim().parse()?;

        let spinner = sync_spinner("Synchronizing session...");
        let wallet = Arc::new(RpcWallet::connect(&self.provider_url, signer).await?);
        let orchestrator = SessionOrchestrator::new(config);
        orchestrator.discover(Some(wallet));
        let snapshot = orchestrator.connect().await;
        spinner.finish_and_clear();

        if snapshot.last_error.is_some() {
            print_snapshot(&orchestrator, &snapshot);
            return Ok(());
        }

        let amount = match self.amount {
            Some(amount) => amount,
            None => {
                let max = snapshot.supply.max_per_tx.max(1);
                Input::new()
                    .with_prompt(format!("Tokens to mint (1-{max})"))
                    .validate_with(move |input: &u64| -> Result<(), String> {
                        if *input >= 1 && *input <= max {
                            Ok(())
                        } else {
                            Err(format!("Enter an amount between 1 and {max}"))
                        }
                    })
                    .interact()?
            }
        };

        let payment = snapshot.payment_for(amount);
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Mint {} token(s) for {} ETH?",
                    amount,
                    format_ether(payment)
                ))
                .default(true)
                .interact()?;
            if !confirmed {
                println!("{}", "Mint cancelled.".bright_yellow());
                return Ok(());
            }
        }

        let spinner = sync_spinner("Submitting transaction...");
        let tx_hash = if self.whitelist {
            orchestrator.mint_whitelist(amount).await
        } else {
            orchestrator.mint_public(amount).await
        };
        spinner.finish_and_clear();

        match tx_hash {
            Some(tx_hash) => {
                let explorer = &snapshot.active_network.block_explorer;
                println!(
                    "{} {}",
                    "Transaction submitted:".bright_green().bold(),
                    tx_hash
                );
                println!("   {}", explorer.transaction_url(&tx_hash.to_string()));
                println!();
                println!(
                    "{}",
                    "Supply counters update on the next status run.".bright_black()
                );
            }
            None => {
                if let Some(notice) = orchestrator.snapshot().last_error {
                    println!("{} {}", "!".bright_red().bold(), notice.text().bright_red());
                }
            }
        }
        Ok(())
    }
}
