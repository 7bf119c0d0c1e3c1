//! Core types shared by the driver and the flows

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default bound on driver rounds
pub const DEFAULT_MAX_ROUNDS: usize = 64;

/// Version of the protocol message format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProtocolVersion {
    V1,
}

impl ProtocolVersion {
    /// Version currently produced by this crate
    pub const CURRENT: ProtocolVersion = ProtocolVersion::V1;

    /// Wire number of this version
    pub fn number(&self) -> u32 {
        match self {
            ProtocolVersion::V1 => 1,
        }
    }
}

impl TryFrom<u32> for ProtocolVersion {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(ProtocolVersion::V1),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u32 {
    fn from(version: ProtocolVersion) -> Self {
        version.number()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Configuration for a driver run
///
/// Only [`DriverConfig::new`] and `Default` build one, so the round bound is
/// always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverConfig {
    max_rounds: usize,
}

impl DriverConfig {
    /// Create a new driver configuration
    pub fn new(max_rounds: usize) -> Result<Self> {
        if max_rounds == 0 {
            return Err(Error::InvalidConfig("max_rounds must be at least 1".into()));
        }
        Ok(Self { max_rounds })
    }

    /// Maximum number of rounds before the run is declared stalled.
    /// One round is one `advance` call on each side.
    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }
}

impl<'de> Deserialize<'de> for DriverConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            max_rounds: usize,
        }

        let raw = Raw::deserialize(deserializer)?;
        DriverConfig::new(raw.max_rounds).map_err(serde::de::Error::custom)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}
