use alloy::primitives::Address;
use clap::Args;
use colored::*;
use dialoguer::Input;

use mintgate_lib::Whitelist;

use crate::{load_config, validate_address};

/// Export the whitelist Merkle proof for an address
#[derive(Args, Debug)]
pub struct ProofCommand {
    /// Address to look up (will prompt if not provided)
    #[arg(long, short = 'a')]
    pub address: Option<String>,

    /// Path to a collection configuration JSON file
    #[arg(long, short = 'c')]
    pub config: Option<String>,
}

impl ProofCommand {
    pub async fn execute(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", "Whitelist Proof".bright_magenta().bold());
        println!("{}", "═".repeat(50).bright_black());
        println!();

        let config = load_config(self.config.as_deref())?;
        let whitelist = Whitelist::new(&config.whitelist_addresses);

        let address = match &self.address {
            Some(address) => address.clone(),
            None => Input::new()
                .with_prompt("Address to look up")
                .validate_with(validate_address)
                .interact()?,
        };
        let address: Address = address.parse()?;

        let raw_proof = whitelist.raw_proof_for(&address);
        if raw_proof.is_empty() {
            println!(
                "{}",
                "The given address is not in the whitelist, please double-check.".bright_yellow()
            );
            return Ok(());
        }

        println!("{} {}", "Address:".bright_black(), address);
        if let Some(root) = whitelist.root() {
            println!("{}    {}", "Root:".bright_black(), root);
        }
        println!();
        println!("{}", "Merkle proof:".bright_green().bold());
        println!("{raw_proof}");
        println!();
        println!(
            "{}",
            "Paste it into the block explorer to claim your tokens.".bright_black()
        );
        Ok(())
    }
}
