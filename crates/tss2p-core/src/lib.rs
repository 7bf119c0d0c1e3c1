//! # tss2p Core
//!
//! Orchestration and wire formats for two-party threshold ECDSA over
//! secp256k1.
//!
//! This crate provides:
//! - A driver that alternately advances a validator and a user participant
//! - Key generation, signing and key refresh flows built on that driver
//! - The `<role>:<message>` keyshare text format
//! - The 66-byte `[v][r][s]` signature layout
//! - Public key extraction and signature verification
//!
//! ## Protocol Overview
//!
//! The protocol math lives behind [`ProtocolSuite`], which hands out one
//! [`Participant`] per role. [`Secp256k1Suite`] is a simple additive-share
//! implementation for in-process use and tests.
//!
//! ## Example
//!
//! ```rust
//! use tss2p_core::{keygen, keys, sign, DriverConfig, Secp256k1Suite};
//!
//! let suite = Secp256k1Suite;
//! let config = DriverConfig::default();
//!
//! let pair = keygen::run_keygen(&suite, &config)?;
//! let signature = sign::sign_with_shares(&suite, &pair.validator, &pair.user, b"hello", &config)?;
//! assert!(keys::verify(&suite, &pair.user, b"hello", &signature.serialize())?);
//! # Ok::<(), tss2p_core::Error>(())
//! ```

pub mod error;
pub mod keygen;
pub mod keys;
pub mod message;
pub mod mpc;
pub mod role;
pub mod share;
pub mod sign;
pub mod signature;
pub mod suite;
pub mod types;

pub use error::{Error, Result};
pub use keygen::{refresh_shares, run_keygen, run_refresh};
pub use keys::{ec_point_from_uncompressed, public_key_from_share, verify, PublicKey};
pub use message::ProtocolMessage;
pub use mpc::{run_protocol, Completion, Participant, Status, Step};
pub use role::Role;
pub use share::{build_keyshare_pair, KeysharePair, PartyOutput, Share};
pub use sign::{run_sign, sign_with_shares};
pub use signature::{Signature, SIGNATURE_LEN};
pub use suite::{ProtocolSuite, Secp256k1Suite};
pub use types::{DriverConfig, ProtocolVersion, DEFAULT_MAX_ROUNDS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
