//! Key generation message types

use crate::keys::{decode_point, decode_scalar, encode_point, UNCOMPRESSED_POINT_LEN};
use crate::{Error, ProtocolMessage, Result, Role};
use k256::{ProjectivePoint, Scalar};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Round 1 (validator to user): validator's public share
pub const DKG_ROUND1: &str = "tss2p/dkg/round1";
/// Round 2 (user to validator): user's public share
pub const DKG_ROUND2: &str = "tss2p/dkg/round2";
/// Refresh round 1 (validator to user): ephemeral point
pub const REFRESH_ROUND1: &str = "tss2p/refresh/round1";
/// Refresh round 2 (user to validator): ephemeral point and refreshed public share
pub const REFRESH_ROUND2: &str = "tss2p/refresh/round2";

const VALIDATOR_RESULT: &str = "tss2p/dkg/result/validator";
const USER_RESULT: &str = "tss2p/dkg/result/user";

pub(crate) const PUBLIC_SHARE: &str = "public_share";
pub(crate) const EPHEMERAL: &str = "ephemeral";
const SECRET_SHARE: &str = "secret_share";
const PEER_PUBLIC_SHARE: &str = "peer_public_share";
const PUBLIC_KEY: &str = "public_key";

/// Protocol name of a key generation result for `role`
pub fn result_protocol(role: Role) -> &'static str {
    match role {
        Role::Validator => VALIDATOR_RESULT,
        Role::User => USER_RESULT,
    }
}

/// One party's completed key generation or refresh output
///
/// The joint key is `public_share + peer_public_share`, and `secret_share`
/// is the discrete log of `public_share`. The secret share is wiped on drop.
#[derive(Clone)]
pub struct DkgOutput {
    pub role: Role,
    pub(crate) secret_share: Scalar,
    pub public_share: ProjectivePoint,
    pub peer_public_share: ProjectivePoint,
    pub public_key: ProjectivePoint,
}

impl DkgOutput {
    /// Combine this party's secret share with the peer's public share
    pub fn new(role: Role, secret_share: Scalar, peer_public_share: ProjectivePoint) -> Result<Self> {
        let public_share = ProjectivePoint::GENERATOR * secret_share;
        let public_key = public_share + peer_public_share;
        if public_key == ProjectivePoint::IDENTITY {
            return Err(Error::VerificationFailed("joint public key is the identity".into()));
        }
        Ok(Self {
            role,
            secret_share,
            public_share,
            peer_public_share,
            public_key,
        })
    }

    /// Encode as the result message for this output's role
    pub fn to_message(&self) -> Result<ProtocolMessage> {
        Ok(ProtocolMessage::new(result_protocol(self.role))
            .with_payload(SECRET_SHARE, self.secret_share.to_bytes().to_vec())
            .with_payload(PUBLIC_SHARE, encode_point(&self.public_share)?)
            .with_payload(PEER_PUBLIC_SHARE, encode_point(&self.peer_public_share)?)
            .with_payload(PUBLIC_KEY, encode_point(&self.public_key)?)
            .with_metadata("role", self.role.as_str()))
    }

    /// Decode and check a result message for `role`
    pub fn from_message(role: Role, message: &ProtocolMessage) -> Result<Self> {
        let expected = result_protocol(role);
        if !message.is(expected) {
            return Err(Error::MalformedMessage(format!(
                "expected {expected}, got {}",
                message.protocol
            )));
        }

        let secret = Zeroizing::new(message.fixed_payload::<32>(SECRET_SHARE)?);
        let secret_share = decode_scalar(&secret)?;
        let peer_public_share = decode_point(message.payload(PEER_PUBLIC_SHARE)?)?;
        let output = Self::new(role, secret_share, peer_public_share)?;

        if output.public_share != decode_point(message.payload(PUBLIC_SHARE)?)? {
            return Err(Error::VerificationFailed("public share does not match secret share".into()));
        }
        if output.public_key != decode_point(message.payload(PUBLIC_KEY)?)? {
            return Err(Error::VerificationFailed("public key does not match shares".into()));
        }
        Ok(output)
    }

    /// Uncompressed joint public key from a result message for `role`
    pub fn public_key_from_message(role: Role, message: &ProtocolMessage) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        Self::from_message(role, message)?.public_key_bytes()
    }

    /// Uncompressed joint public key
    pub fn public_key_bytes(&self) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        encode_point(&self.public_key)
    }
}

impl Zeroize for DkgOutput {
    fn zeroize(&mut self) {
        self.secret_share.zeroize();
    }
}

impl Drop for DkgOutput {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for DkgOutput {}

impl fmt::Debug for DkgOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DkgOutput")
            .field("role", &self.role)
            .field("public_key", &self.public_key.to_affine())
            .finish_non_exhaustive()
    }
}
