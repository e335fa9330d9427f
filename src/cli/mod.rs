//! CLI module for MitoAI Gateway
//!
//! - `serve`: run the HTTP server
//! - `hash-password`: produce an Argon2 hash for `auth.admin_password_hash`

pub mod serve;

use clap::{Parser, Subcommand};

use crate::infrastructure::auth::Argon2Hasher;

/// MitoAI Gateway - metered AI generation over multiple LLM providers
#[derive(Parser)]
#[command(name = "mitoai-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway server
    Serve,

    /// Hash an administrator password
    HashPassword {
        password: String,
    },
}

/// Print the Argon2 hash of `password`
pub fn hash_password(password: &str) -> anyhow::Result<()> {
    let hash = Argon2Hasher::new().hash(password)?;
    println!("{}", hash);
    Ok(())
}
