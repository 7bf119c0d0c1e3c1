//! Protocol messages and their text codec
//!
//! A [`ProtocolMessage`] is the opaque unit exchanged between the two
//! participants in one round, and also the form in which participants hand
//! out their final results. Its text encoding is the standard base64 of its
//! JSON form, so it never contains the `:` used by the keyshare format.

use crate::{Error, ProtocolVersion, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message exchanged between participants or returned as a protocol result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMessage {
    /// Name of the protocol step that produced this message
    pub protocol: String,
    /// Message format version
    pub version: ProtocolVersion,
    /// Binary payloads by name
    #[serde(with = "payload_serde")]
    pub payloads: BTreeMap<String, Vec<u8>>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ProtocolMessage {
    /// Create an empty message for a protocol step
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            version: ProtocolVersion::CURRENT,
            payloads: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a binary payload
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(key.into(), value.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a payload, failing if it is absent
    pub fn payload(&self, key: &str) -> Result<&[u8]> {
        self.payloads
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                Error::MalformedMessage(format!(
                    "missing payload {key:?} in {}",
                    self.protocol
                ))
            })
    }

    /// Look up a payload that must be exactly `N` bytes
    pub fn fixed_payload<const N: usize>(&self, key: &str) -> Result<[u8; N]> {
        let bytes = self.payload(key)?;
        bytes.try_into().map_err(|_| {
            Error::MalformedMessage(format!(
                "payload {key:?} in {} is {} bytes, expected {N}",
                self.protocol,
                bytes.len()
            ))
        })
    }

    /// Whether this message was produced by the named protocol step
    pub fn is(&self, protocol: &str) -> bool {
        self.protocol == protocol
    }

    /// Encode to text
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Decode from text produced by [`ProtocolMessage::encode`]
    pub fn decode(text: &str) -> Result<Self> {
        let json = STANDARD.decode(text)?;
        serde_json::from_slice(&json).map_err(|e| Error::MalformedMessage(e.to_string()))
    }
}

mod payload_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(payloads: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        payloads
            .iter()
            .map(|(key, value)| (key.as_str(), STANDARD.encode(value)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                STANDARD
                    .decode(value)
                    .map(|bytes| (key, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
