//! Key refresh participant
//!
//! Refresh re-randomizes both shares without changing the public key.
//! The parties agree on `delta = H(a * b * G)` through an ephemeral
//! Diffie-Hellman exchange, then the validator adds `delta` to its share and
//! the user subtracts it, so the shares still sum to the same secret.

use super::messages::{DkgOutput, EPHEMERAL, PUBLIC_SHARE, REFRESH_ROUND1, REFRESH_ROUND2};
use crate::keys::{decode_point, digest_scalar, encode_point};
use crate::mpc::{expect_message, expect_none, Participant, Step};
use crate::{Error, ProtocolMessage, ProtocolVersion, Result, Role};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use sha3::{Digest, Sha3_256};
use tracing::debug;

const DELTA_DOMAIN: &[u8] = b"tss2p/refresh/delta";

enum RefreshState {
    Start,
    AwaitingPeer { ephemeral: Scalar },
    Done(DkgOutput),
}

/// Refresh participant bound to an existing key generation output
pub struct RefreshParticipant {
    share: DkgOutput,
    state: RefreshState,
}

impl RefreshParticipant {
    /// Create a participant refreshing `share`
    pub fn new(share: DkgOutput) -> Self {
        Self {
            share,
            state: RefreshState::Start,
        }
    }

    /// Refreshed output, once finished
    pub fn output(&self) -> Option<&DkgOutput> {
        match &self.state {
            RefreshState::Done(output) => Some(output),
            _ => None,
        }
    }

    /// Shift this party's share by the agreed offset and check the joint key
    fn refreshed(&self, delta: Scalar, peer_public_share: ProjectivePoint) -> Result<DkgOutput> {
        let secret = match self.share.role {
            Role::Validator => self.share.secret_share + delta,
            Role::User => self.share.secret_share - delta,
        };
        let output = DkgOutput::new(self.share.role, secret, peer_public_share)?;
        if output.public_key != self.share.public_key {
            return Err(Error::VerificationFailed(
                "refreshed shares do not preserve the public key".into(),
            ));
        }
        Ok(output)
    }
}

fn derive_delta(secret: &Scalar, peer_ephemeral: &ProjectivePoint) -> Result<Scalar> {
    let shared = encode_point(&(*peer_ephemeral * secret))?;
    let digest: [u8; 32] = Sha3_256::new()
        .chain_update(DELTA_DOMAIN)
        .chain_update(shared)
        .finalize()
        .into();
    Ok(digest_scalar(&digest))
}

impl Participant for RefreshParticipant {
    type Error = Error;

    fn role(&self) -> Role {
        self.share.role
    }

    fn advance(&mut self, incoming: Option<ProtocolMessage>) -> Result<Step> {
        match (self.share.role, &self.state) {
            (Role::Validator, RefreshState::Start) => {
                expect_none(incoming, "starting refresh")?;
                let ephemeral = Scalar::random(&mut OsRng);
                let outgoing = ProtocolMessage::new(REFRESH_ROUND1)
                    .with_payload(EPHEMERAL, encode_point(&(ProjectivePoint::GENERATOR * ephemeral))?);
                self.state = RefreshState::AwaitingPeer { ephemeral };
                Ok(Step::ongoing(outgoing))
            }
            (Role::Validator, RefreshState::AwaitingPeer { ephemeral }) => {
                let message = expect_message(incoming, REFRESH_ROUND2)?;
                let peer_ephemeral = decode_point(message.payload(EPHEMERAL)?)?;
                let peer_public_share = decode_point(message.payload(PUBLIC_SHARE)?)?;
                let delta = derive_delta(ephemeral, &peer_ephemeral)?;
                let output = self.refreshed(delta, peer_public_share)?;
                self.state = RefreshState::Done(output);
                debug!(role = %self.share.role, "Refresh completed");
                Ok(Step::finished(None))
            }
            (Role::User, RefreshState::Start) => {
                let message = expect_message(incoming, REFRESH_ROUND1)?;
                let peer_ephemeral = decode_point(message.payload(EPHEMERAL)?)?;
                let ephemeral = Scalar::random(&mut OsRng);
                let delta = derive_delta(&ephemeral, &peer_ephemeral)?;

                let peer_public_share = self.share.peer_public_share + ProjectivePoint::GENERATOR * delta;
                let output = self.refreshed(delta, peer_public_share)?;
                let outgoing = ProtocolMessage::new(REFRESH_ROUND2)
                    .with_payload(EPHEMERAL, encode_point(&(ProjectivePoint::GENERATOR * ephemeral))?)
                    .with_payload(PUBLIC_SHARE, encode_point(&output.public_share)?);
                self.state = RefreshState::Done(output);
                debug!(role = %self.share.role, "Refresh completed");
                Ok(Step::finished(Some(outgoing)))
            }
            (Role::User, RefreshState::AwaitingPeer { .. }) => {
                Err(Error::Internal("user never waits during refresh".into()))
            }
            (_, RefreshState::Done(_)) => {
                expect_none(incoming, "refresh is complete")?;
                Ok(Step::finished(None))
            }
        }
    }

    fn result(&self, version: ProtocolVersion) -> Result<ProtocolMessage> {
        match version {
            ProtocolVersion::V1 => self
                .output()
                .ok_or_else(|| Error::NotFinished(format!("{} refresh", self.share.role)))?
                .to_message(),
        }
    }
}
