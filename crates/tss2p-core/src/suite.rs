//! Protocol suites
//!
//! A suite supplies the participants for each flow and the decoders for
//! their results. The driver and codecs in this crate only talk to
//! participants through [`Participant`]; [`Secp256k1Suite`] is the
//! reference implementation used in-process and in tests.

use crate::keygen::{DkgOutput, DkgParticipant, RefreshParticipant};
use crate::keys::UNCOMPRESSED_POINT_LEN;
use crate::mpc::Participant;
use crate::sign::{self, SignParticipant};
use crate::{ProtocolMessage, Result, Role, Signature};

/// Source of protocol participants and result decoders
pub trait ProtocolSuite {
    /// Key generation participant
    type Keygen: Participant;
    /// Signing participant
    type Sign: Participant;
    /// Key refresh participant
    type Refresh: Participant;

    /// Fresh key generation participant for `role`
    fn keygen(&self, role: Role) -> Result<Self::Keygen>;

    /// Signing participant bound to a keyshare result and the message to sign
    fn sign(&self, role: Role, keyshare: &ProtocolMessage, message: &[u8]) -> Result<Self::Sign>;

    /// Refresh participant bound to a keyshare result
    fn refresh(&self, role: Role, keyshare: &ProtocolMessage) -> Result<Self::Refresh>;

    /// Uncompressed public key carried by a key generation or refresh result
    fn dkg_public_key(&self, role: Role, result: &ProtocolMessage) -> Result<[u8; UNCOMPRESSED_POINT_LEN]>;

    /// Signature carried by the user-role signing result
    fn decode_signature(&self, result: &ProtocolMessage) -> Result<Signature>;
}

/// Reference two-party suite over secp256k1
///
/// Keys are additively shared between the two roles. The signing protocol
/// lets the user-role party complete the signature from the validator's
/// contribution, which reveals that contribution to it; the suite is meant
/// for co-located parties and for exercising the driver, not for
/// deployments where the parties distrust each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Suite;

impl ProtocolSuite for Secp256k1Suite {
    type Keygen = DkgParticipant;
    type Sign = SignParticipant;
    type Refresh = RefreshParticipant;

    fn keygen(&self, role: Role) -> Result<DkgParticipant> {
        Ok(DkgParticipant::new(role))
    }

    fn sign(&self, role: Role, keyshare: &ProtocolMessage, message: &[u8]) -> Result<SignParticipant> {
        let share = DkgOutput::from_message(role, keyshare)?;
        Ok(SignParticipant::new(share, message))
    }

    fn refresh(&self, role: Role, keyshare: &ProtocolMessage) -> Result<RefreshParticipant> {
        let share = DkgOutput::from_message(role, keyshare)?;
        Ok(RefreshParticipant::new(share))
    }

    fn dkg_public_key(&self, role: Role, result: &ProtocolMessage) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        DkgOutput::public_key_from_message(role, result)
    }

    fn decode_signature(&self, result: &ProtocolMessage) -> Result<Signature> {
        sign::decode_signature(result)
    }
}
