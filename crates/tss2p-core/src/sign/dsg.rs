//! Two-party signing participant
//!
//! The nonce is multiplicatively shared, `k = k_v * k_u`, so both sides can
//! compute `R = k * G` from the other's nonce point. The validator then
//! contributes `w = k_v^-1 (z + r x_v)` together with `k_v^-1`, and the user
//! completes `s = k_u^-1 (w + k_v^-1 r x_u) = k^-1 (z + r x)`.

use super::messages::{
    signature_message, NONCE_INVERSE, NONCE_POINT, PARTIAL, SIGN_ROUND1, SIGN_ROUND2, SIGN_ROUND3,
};
use crate::keygen::DkgOutput;
use crate::keys::{
    decode_point, decode_scalar, digest_scalar, encode_point, message_digest, verify_signature, PublicKey,
};
use crate::mpc::{expect_message, expect_none, Participant, Step};
use crate::{Error, ProtocolMessage, ProtocolVersion, Result, Role, Signature};
use k256::ecdsa::{self, RecoveryId};
use k256::elliptic_curve::{bigint::U256, ops::Reduce, point::AffineCoordinates, scalar::IsHigh, Field};
use k256::{ProjectivePoint, Scalar};
use rand::rngs::OsRng;
use tracing::debug;

enum SignState {
    Start,
    ValidatorAwaiting { nonce: Scalar },
    UserAwaiting { nonce: Scalar, r_point: ProjectivePoint },
    Done(Option<Signature>),
}

/// Signing participant bound to a keyshare and a message
pub struct SignParticipant {
    share: DkgOutput,
    digest: [u8; 32],
    state: SignState,
}

impl SignParticipant {
    /// Create a participant signing the SHA3-256 digest of `message`
    pub fn new(share: DkgOutput, message: &[u8]) -> Self {
        Self {
            share,
            digest: message_digest(message),
            state: SignState::Start,
        }
    }

    /// Completed signature; only the user side ever holds one
    pub fn signature(&self) -> Option<&Signature> {
        match &self.state {
            SignState::Done(signature) => signature.as_ref(),
            _ => None,
        }
    }

    fn finish_validator(&self, nonce: &Scalar, incoming: Option<ProtocolMessage>) -> Result<ProtocolMessage> {
        let message = expect_message(incoming, SIGN_ROUND2)?;
        let peer_nonce = decode_point(message.payload(NONCE_POINT)?)?;
        let r = x_scalar(&(peer_nonce * nonce))?;

        let nonce_inverse = invert(nonce)?;
        let z = digest_scalar(&self.digest);
        let partial = nonce_inverse * (z + r * self.share.secret_share);

        Ok(ProtocolMessage::new(SIGN_ROUND3)
            .with_payload(PARTIAL, partial.to_bytes().to_vec())
            .with_payload(NONCE_INVERSE, nonce_inverse.to_bytes().to_vec()))
    }

    fn finish_user(
        &self,
        nonce: &Scalar,
        r_point: &ProjectivePoint,
        incoming: Option<ProtocolMessage>,
    ) -> Result<Signature> {
        let message = expect_message(incoming, SIGN_ROUND3)?;
        let partial = decode_scalar(&message.fixed_payload(PARTIAL)?)?;
        let peer_nonce_inverse = decode_scalar(&message.fixed_payload(NONCE_INVERSE)?)?;

        let r = x_scalar(r_point)?;
        let mut s = invert(nonce)? * (partial + peer_nonce_inverse * r * self.share.secret_share);
        if bool::from(s.is_zero()) {
            return Err(Error::Crypto("signature scalar s is zero".into()));
        }

        let affine = r_point.to_affine();
        let mut y_is_odd = bool::from(affine.y_is_odd());
        if bool::from(s.is_high()) {
            s = -s;
            y_is_odd = !y_is_odd;
        }
        let x_is_reduced = r.to_bytes() != affine.x();
        let recovery_id = RecoveryId::new(y_is_odd, x_is_reduced);

        let ecdsa = ecdsa::Signature::from_scalars(r.to_bytes(), s.to_bytes())
            .map_err(|e| Error::Crypto(e.to_string()))?;
        let signature = Signature::from((ecdsa, recovery_id));
        let public_key = PublicKey::from_point(&self.share.public_key)?;
        if !verify_signature(&public_key, &self.digest, &signature) {
            return Err(Error::VerificationFailed(
                "combined signature does not verify under the joint key".into(),
            ));
        }
        Ok(signature)
    }
}

fn nonce_message(protocol: &str, nonce: &Scalar) -> Result<ProtocolMessage> {
    let point = encode_point(&(ProjectivePoint::GENERATOR * nonce))?;
    Ok(ProtocolMessage::new(protocol).with_payload(NONCE_POINT, point))
}

/// `r = R.x mod n`, rejecting zero
fn x_scalar(point: &ProjectivePoint) -> Result<Scalar> {
    let r = <Scalar as Reduce<U256>>::reduce_bytes(&point.to_affine().x());
    if bool::from(r.is_zero()) {
        return Err(Error::Crypto("nonce point has zero x coordinate".into()));
    }
    Ok(r)
}

fn invert(scalar: &Scalar) -> Result<Scalar> {
    Option::<Scalar>::from(scalar.invert()).ok_or_else(|| Error::Crypto("nonce is zero".into()))
}

impl Participant for SignParticipant {
    type Error = Error;

    fn role(&self) -> Role {
        self.share.role
    }

    fn advance(&mut self, incoming: Option<ProtocolMessage>) -> Result<Step> {
        match (self.share.role, &self.state) {
            (Role::Validator, SignState::Start) => {
                expect_none(incoming, "starting signing")?;
                let nonce = Scalar::random(&mut OsRng);
                let outgoing = nonce_message(SIGN_ROUND1, &nonce)?;
                self.state = SignState::ValidatorAwaiting { nonce };
                Ok(Step::ongoing(outgoing))
            }
            (Role::User, SignState::Start) => {
                let message = expect_message(incoming, SIGN_ROUND1)?;
                let peer_nonce = decode_point(message.payload(NONCE_POINT)?)?;
                let nonce = Scalar::random(&mut OsRng);
                let r_point = peer_nonce * nonce;
                let outgoing = nonce_message(SIGN_ROUND2, &nonce)?;
                self.state = SignState::UserAwaiting { nonce, r_point };
                Ok(Step::ongoing(outgoing))
            }
            (Role::Validator, SignState::ValidatorAwaiting { nonce }) => {
                let outgoing = self.finish_validator(nonce, incoming)?;
                self.state = SignState::Done(None);
                debug!(role = %self.share.role, "Partial signature sent");
                Ok(Step::finished(Some(outgoing)))
            }
            (Role::User, SignState::UserAwaiting { nonce, r_point }) => {
                let signature = self.finish_user(nonce, r_point, incoming)?;
                self.state = SignState::Done(Some(signature));
                debug!(role = %self.share.role, "Signature completed");
                Ok(Step::finished(None))
            }
            (_, SignState::Done(_)) => {
                expect_none(incoming, "signing is complete")?;
                Ok(Step::finished(None))
            }
            (role, _) => Err(Error::Internal(format!("{role} reached a state of the other role"))),
        }
    }

    fn result(&self, version: ProtocolVersion) -> Result<ProtocolMessage> {
        match (version, &self.state) {
            (ProtocolVersion::V1, SignState::Done(Some(signature))) => Ok(signature_message(signature)),
            (ProtocolVersion::V1, SignState::Done(None)) => Err(Error::NotFinished(format!(
                "{} holds no signature",
                self.share.role
            ))),
            (ProtocolVersion::V1, _) => Err(Error::NotFinished(format!("{} signing", self.share.role))),
        }
    }
}
