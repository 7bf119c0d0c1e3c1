//! Two-party key generation participant
//!
//! The joint key is `Q = X_v + X_u` with `X_i = x_i * G`:
//!
//! 1. validator: samples `x_v`, sends `X_v`
//! 2. user: samples `x_u`, sends `X_u`, finishes
//! 3. validator: computes `Q`, finishes

use super::messages::{DkgOutput, DKG_ROUND1, DKG_ROUND2, PUBLIC_SHARE};
use crate::keys::{decode_point, encode_point};
use crate::mpc::{expect_message, expect_none, Participant, Step};
use crate::{Error, ProtocolMessage, ProtocolVersion, Result, Role};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use tracing::debug;

enum DkgState {
    Start,
    AwaitingPeer { secret: Scalar },
    Done(DkgOutput),
}

/// Key generation participant for one role
pub struct DkgParticipant {
    role: Role,
    state: DkgState,
}

impl DkgParticipant {
    /// Create a fresh participant
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: DkgState::Start,
        }
    }

    /// Output, once finished
    pub fn output(&self) -> Option<&DkgOutput> {
        match &self.state {
            DkgState::Done(output) => Some(output),
            _ => None,
        }
    }
}

fn public_share_message(protocol: &str, secret: &Scalar) -> Result<ProtocolMessage> {
    let point = encode_point(&(ProjectivePoint::GENERATOR * secret))?;
    Ok(ProtocolMessage::new(protocol).with_payload(PUBLIC_SHARE, point))
}

impl Participant for DkgParticipant {
    type Error = Error;

    fn role(&self) -> Role {
        self.role
    }

    fn advance(&mut self, incoming: Option<ProtocolMessage>) -> Result<Step> {
        match (self.role, &self.state) {
            (Role::Validator, DkgState::Start) => {
                expect_none(incoming, "starting key generation")?;
                let secret = Scalar::random(&mut OsRng);
                let outgoing = public_share_message(DKG_ROUND1, &secret)?;
                self.state = DkgState::AwaitingPeer { secret };
                debug!(role = %self.role, "DKG public share sent");
                Ok(Step::ongoing(outgoing))
            }
            (Role::Validator, DkgState::AwaitingPeer { secret }) => {
                let message = expect_message(incoming, DKG_ROUND2)?;
                let peer = decode_point(message.payload(PUBLIC_SHARE)?)?;
                let output = DkgOutput::new(self.role, *secret, peer)?;
                self.state = DkgState::Done(output);
                debug!(role = %self.role, "DKG completed");
                Ok(Step::finished(None))
            }
            (Role::User, DkgState::Start) => {
                let message = expect_message(incoming, DKG_ROUND1)?;
                let peer = decode_point(message.payload(PUBLIC_SHARE)?)?;
                let secret = Scalar::random(&mut OsRng);
                let output = DkgOutput::new(self.role, secret, peer)?;
                let outgoing = public_share_message(DKG_ROUND2, &secret)?;
                self.state = DkgState::Done(output);
                debug!(role = %self.role, "DKG completed");
                Ok(Step::finished(Some(outgoing)))
            }
            (Role::User, DkgState::AwaitingPeer { .. }) => {
                Err(Error::Internal("user never waits during key generation".into()))
            }
            (_, DkgState::Done(_)) => {
                expect_none(incoming, "key generation is complete")?;
                Ok(Step::finished(None))
            }
        }
    }

    fn result(&self, version: ProtocolVersion) -> Result<ProtocolMessage> {
        match version {
            ProtocolVersion::V1 => self
                .output()
                .ok_or_else(|| Error::NotFinished(format!("{} key generation", self.role)))?
                .to_message(),
        }
    }
}
