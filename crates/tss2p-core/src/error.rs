//! Error types for two-party protocol orchestration

use crate::Role;
use thiserror::Error;

/// Result type alias for tss2p operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error reported by a protocol participant
pub type ParticipantError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while driving the protocol or handling its artifacts
#[derive(Debug, Error)]
pub enum Error {
    // ============ Validation Errors ============
    /// Role tag is not one of the recognized roles
    #[error("Invalid role: {0:?}")]
    InvalidRole(String),

    /// Keyshare text does not have the `<role>:<message>` shape
    #[error("Malformed keyshare: {0}")]
    MalformedShare(String),

    /// Protocol message payload failed to decode
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Signature buffer has the wrong length
    #[error("Malformed signature: expected 66 bytes, got {len}")]
    MalformedSignature { len: usize },

    /// R or S needs more than 32 bytes
    #[error("Signature component {component} is {len} bytes, at most 32 allowed")]
    SignatureComponentTooLarge { component: &'static str, len: usize },

    /// Public key encoding is not a 65-byte uncompressed SEC1 point
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Point could not be materialized on the curve
    #[error("Curve conversion failed: {0}")]
    CurveConversion(String),

    /// Both keyshare results carry the same role
    #[error("Duplicate role in keyshare pair: {0}")]
    DuplicateRole(Role),

    /// Participant was passed in the wrong position
    #[error("Role mismatch: expected {expected}, got {actual}")]
    RoleMismatch { expected: Role, actual: Role },

    /// Protocol version is not supported
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u32),

    /// Invalid driver configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ============ Protocol Errors ============
    /// A participant failed while advancing or producing its result
    #[error("Protocol error from {role}: {source}")]
    Protocol {
        role: Role,
        #[source]
        source: ParticipantError,
    },

    /// Participants did not finish within the round bound
    #[error("Protocol stalled after {rounds} rounds")]
    ProtocolStalled { rounds: usize },

    /// Participant received a message it cannot handle in its current state
    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),

    /// Participant expected a message but received none
    #[error("Missing message: {0}")]
    MissingMessage(String),

    /// Result requested before the participant finished
    #[error("Result not available: {0}")]
    NotFinished(String),

    /// Consistency check failed
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Cryptographic operation failed
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a participant failure, tagging it with the side that produced it
    pub fn protocol<E>(role: Role, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Protocol {
            role,
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::MalformedMessage(e.to_string())
    }
}
