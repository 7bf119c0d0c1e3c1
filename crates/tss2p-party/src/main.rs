//! tss2p Party CLI
//!
//! Runs both roles of the two-party protocol in-process and keeps their
//! keyshares as text files:
//! - Key generation
//! - Key refresh
//! - Signing and verification

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tss2p_core::{
    keys, refresh_shares, run_keygen, sign_with_shares, DriverConfig, KeysharePair, Role,
    Secp256k1Suite, Share,
};

/// tss2p Party - two-party threshold ECDSA
#[derive(Parser)]
#[command(name = "tss2p-party")]
#[command(about = "Two-party threshold ECDSA flows over secp256k1")]
#[command(version)]
struct Cli {
    /// Data directory for keyshares
    #[arg(short, long, env = "DEST", default_value = "./data")]
    dest: PathBuf,

    /// Round bound for each protocol run
    #[arg(long, env = "MAX_ROUNDS", default_value_t = tss2p_core::DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new keyshare pair
    Keygen,

    /// Sign a message with the stored shares
    Sign {
        #[command(flatten)]
        message: MessageArgs,
    },

    /// Refresh the stored shares, keeping the public key
    Refresh,

    /// Verify a signature against a stored share
    Verify {
        #[command(flatten)]
        message: MessageArgs,

        /// Signature as hex (66 bytes)
        #[arg(short, long)]
        signature: String,

        /// Share to take the public key from
        #[arg(short, long, default_value = "user")]
        role: Role,
    },

    /// Show keyshare info
    Info,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct MessageArgs {
    /// Message as UTF-8 text
    #[arg(short, long)]
    message: Option<String>,

    /// Message as hex
    #[arg(long)]
    message_hex: Option<String>,
}

impl MessageArgs {
    fn bytes(&self) -> Result<Vec<u8>> {
        match (&self.message, &self.message_hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(hex)) => hex::decode(hex).context("Message is not valid hex"),
            (None, None) => anyhow::bail!("A message is required"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = DriverConfig::new(cli.max_rounds)?;

    // Ensure data directory exists
    std::fs::create_dir_all(&cli.dest)?;

    match cli.command {
        Commands::Keygen => run_keygen_command(&cli.dest, &config)?,
        Commands::Sign { ref message } => run_sign_command(&cli.dest, &config, &message.bytes()?)?,
        Commands::Refresh => run_refresh_command(&cli.dest, &config)?,
        Commands::Verify {
            ref message,
            ref signature,
            role,
        } => {
            if !run_verify_command(&cli.dest, &message.bytes()?, signature, role)? {
                std::process::exit(1);
            }
        }
        Commands::Info => show_info(&cli.dest)?,
    }

    Ok(())
}

fn run_keygen_command(dest: &Path, config: &DriverConfig) -> Result<()> {
    info!(dest = ?dest, "Starting key generation");

    let pair = run_keygen(&Secp256k1Suite, config)?;
    save_pair(dest, &pair)?;
    let public_key = pair.validator.public_key(&Secp256k1Suite)?;

    info!(
        public_key = hex::encode(public_key),
        "Key generation completed, shares saved"
    );

    // Print public key
    println!("Public Key: {}", hex::encode(public_key));

    Ok(())
}

fn run_sign_command(dest: &Path, config: &DriverConfig, message: &[u8]) -> Result<()> {
    let validator = load_share(dest, Role::Validator)?;
    let user = load_share(dest, Role::User)?;

    info!(message_len = message.len(), "Starting signing");

    let signature = sign_with_shares(&Secp256k1Suite, &validator, &user, message, config)?;

    // Print signature
    println!("Signature: {}", hex::encode(signature.serialize()));
    println!("  v: {}", signature.v);
    println!("  r: {}", hex::encode(signature.r));
    println!("  s: {}", hex::encode(signature.s));

    Ok(())
}

fn run_refresh_command(dest: &Path, config: &DriverConfig) -> Result<()> {
    let validator = load_share(dest, Role::Validator)?;
    let user = load_share(dest, Role::User)?;

    info!("Starting key refresh");

    let refreshed = refresh_shares(&Secp256k1Suite, &validator, &user, config)?;
    save_pair(dest, &refreshed)?;

    info!("Key refresh completed, shares replaced");

    Ok(())
}

fn run_verify_command(dest: &Path, message: &[u8], signature: &str, role: Role) -> Result<bool> {
    let share = load_share(dest, role)?;
    let signature = hex::decode(signature).context("Signature is not valid hex")?;

    let valid = keys::verify(&Secp256k1Suite, &share, message, &signature)?;
    println!("{}", if valid { "valid" } else { "invalid" });

    Ok(valid)
}

fn show_info(dest: &Path) -> Result<()> {
    println!("Keyshare Info:");
    for role in Role::ALL {
        let share = load_share(dest, role)?;
        let public_key = share.public_key(&Secp256k1Suite)?;
        println!("  {}:", share.role());
        println!("    Path: {}", share_path(dest, role).display());
        println!("    Public Key: {}", hex::encode(public_key));
    }

    Ok(())
}

fn share_path(dest: &Path, role: Role) -> PathBuf {
    dest.join(format!("{role}.share"))
}

/// Write both shares next to their targets, then move them into place
///
/// Neither share is replaced unless both were written.
fn save_pair(dest: &Path, pair: &KeysharePair) -> Result<()> {
    let mut staged = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let path = share_path(dest, role);
        let temp = path.with_extension("share.tmp");
        if let Err(e) = std::fs::write(&temp, pair.get(role).as_str()) {
            for (written, _) in &staged {
                let _ = std::fs::remove_file(written);
            }
            let _ = std::fs::remove_file(&temp);
            return Err(e).with_context(|| format!("Failed to write {}", temp.display()));
        }
        staged.push((temp, path));
    }

    for (temp, path) in staged {
        std::fs::rename(&temp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
    }
    Ok(())
}

fn load_share(dest: &Path, role: Role) -> Result<Share> {
    let path = share_path(dest, role);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let share: Share = text.trim().parse()?;
    if share.role() != role {
        anyhow::bail!("{} holds a {} share", path.display(), share.role());
    }
    Ok(share)
}
