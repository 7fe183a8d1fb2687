//! Mintgate Command-Line Client
//!
//! Terminal consumer of the session core. It provides:
//!
//! - Live JSON-RPC implementations of the wallet and contract capabilities
//! - Collection status, public mint, whitelist mint, and proof export
//!   commands
//!
//! The browser wallet is replaced by a local signing key; everything else
//! (network validation, contract binding, synchronization, mint dispatch)
//! runs through the same orchestrator the web presentation layer uses.

use std::env;

use colored::*;
use dialoguer::Password;

use mintgate_lib::CollectionConfig;

pub mod chain;
pub mod commands;

/// Expand environment variables in a string (e.g., "$PRIVATE_KEY" -> actual value)
pub fn expand_env_vars(input: &str) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(var_name) = input.strip_prefix('$') {
        match env::var(var_name) {
            Ok(value) => Ok(value),
            Err(_) => {
                eprintln!(
                    "{} Environment variable {} not found",
                    "!".bright_red(),
                    var_name
                );
                Err(format!("Environment variable {} not found", var_name).into())
            }
        }
    } else {
        Ok(input.to_string())
    }
}

/// Load the collection configuration from `path`, or fall back to the
/// compiled-in defaults when no path is given.
pub fn load_config(path: Option<&str>) -> Result<CollectionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(CollectionConfig::load(path)?),
        None => Ok(CollectionConfig::default()),
    }
}

/// Resolve the signing key: flag value (with `$VAR` expansion) or a hidden
/// prompt.
pub fn resolve_private_key(flag: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    match flag {
        Some(value) => expand_env_vars(value),
        None => {
            let key: String = Password::new()
                .with_prompt("Private key for the session account")
                .interact()?;
            Ok(key)
        }
    }
}

/// Dialoguer-compatible check for a 0x-prefixed Ethereum address.
pub fn validate_address(input: &String) -> Result<(), &'static str> {
    if input.starts_with("0x") && input.len() == 42 {
        Ok(())
    } else {
        Err("Please enter a valid Ethereum address (0x...)")
    }
}
