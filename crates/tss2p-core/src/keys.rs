//! Public key extraction and signature verification

use crate::suite::ProtocolSuite;
use crate::{Error, Result, Share, Signature};
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{RecoveryId, VerifyingKey};
use k256::elliptic_curve::{
    bigint::U256,
    ops::Reduce,
    sec1::{FromEncodedPoint, ToEncodedPoint},
    PrimeField,
};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use sha3::{Digest, Sha3_256};
use tracing::debug;

/// Length of an uncompressed SEC1 point
pub const UNCOMPRESSED_POINT_LEN: usize = 65;

/// SEC1 tag of an uncompressed point
pub const UNCOMPRESSED_TAG: u8 = 0x04;

/// Public key on secp256k1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl PublicKey {
    /// X coordinate, big-endian
    pub fn x(&self) -> [u8; 32] {
        let mut x = [0u8; 32];
        x.copy_from_slice(&self.to_uncompressed()[1..33]);
        x
    }

    /// Y coordinate, big-endian
    pub fn y(&self) -> [u8; 32] {
        let mut y = [0u8; 32];
        y.copy_from_slice(&self.to_uncompressed()[33..]);
        y
    }

    /// 65-byte uncompressed encoding
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_POINT_LEN] {
        let mut out = [0u8; UNCOMPRESSED_POINT_LEN];
        out.copy_from_slice(self.0.to_encoded_point(false).as_bytes());
        out
    }

    /// 33-byte compressed encoding
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        out
    }

    /// ECDSA verifying key for this point
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from(&self.0)
    }

    pub(crate) fn from_point(point: &ProjectivePoint) -> Result<Self> {
        k256::PublicKey::from_affine(point.to_affine())
            .map(PublicKey)
            .map_err(|_| Error::CurveConversion("identity is not a public key".into()))
    }
}

/// Build a public key from `[0x04][X:32][Y:32]`
pub fn ec_point_from_uncompressed(bytes: &[u8]) -> Result<PublicKey> {
    if bytes.len() != UNCOMPRESSED_POINT_LEN {
        return Err(Error::InvalidPublicKey(format!(
            "expected {UNCOMPRESSED_POINT_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != UNCOMPRESSED_TAG {
        return Err(Error::InvalidPublicKey(format!(
            "expected tag 0x04, got {:#04x}",
            bytes[0]
        )));
    }

    let encoded = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&bytes[1..33]),
        FieldBytes::from_slice(&bytes[33..]),
        false,
    );
    Option::<k256::PublicKey>::from(k256::PublicKey::from_encoded_point(&encoded))
        .map(PublicKey)
        .ok_or_else(|| Error::CurveConversion("point is not on secp256k1".into()))
}

/// Public key of the key a share belongs to
pub fn public_key_from_share<S: ProtocolSuite>(suite: &S, share: &Share) -> Result<PublicKey> {
    ec_point_from_uncompressed(&share.public_key(suite)?)
}

/// SHA3-256 digest signed by the protocol
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    Sha3_256::digest(message).into()
}

/// Verify `signature` over `message` under the key of `share`
///
/// Structurally invalid inputs are errors; a well-formed signature that
/// does not match returns `Ok(false)`.
pub fn verify<S: ProtocolSuite>(
    suite: &S,
    share: &Share,
    message: &[u8],
    signature: &[u8],
) -> Result<bool> {
    let public_key = public_key_from_share(suite, share)?;
    let signature = match Signature::deserialize(signature) {
        Ok(signature) => signature,
        // An `s` wider than 32 bytes is at least the group order
        Err(Error::SignatureComponentTooLarge { .. }) => return Ok(false),
        Err(e) => return Err(e),
    };
    let digest = message_digest(message);
    Ok(verify_signature(&public_key, &digest, &signature))
}

/// Check a parsed signature and its recovery byte against a digest
///
/// Both `s` and `n - s` are accepted; for the high form the recovery byte
/// must carry the flipped y parity.
pub fn verify_signature(public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
    let Ok(mut ecdsa) = signature.to_ecdsa() else {
        debug!("Signature scalars out of range");
        return false;
    };
    let Some(mut recovery_id) = signature.recovery_id() else {
        debug!(v = signature.v, "Invalid recovery byte");
        return false;
    };
    if let Some(normalized) = ecdsa.normalize_s() {
        ecdsa = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let verifying_key = public_key.verifying_key();
    if verifying_key.verify_prehash(digest, &ecdsa).is_err() {
        return false;
    }

    // The recovery byte must lead back to the same key
    match VerifyingKey::recover_from_prehash(digest, &ecdsa, recovery_id) {
        Ok(recovered) => recovered == verifying_key,
        Err(_) => false,
    }
}

// ============ Point and scalar encoding shared by the reference suite ============

pub(crate) fn encode_point(point: &ProjectivePoint) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
    let encoded = point.to_affine().to_encoded_point(false);
    // The identity encodes to a single byte
    encoded
        .as_bytes()
        .try_into()
        .map_err(|_| Error::Crypto("identity point".into()))
}

pub(crate) fn decode_point(bytes: &[u8]) -> Result<ProjectivePoint> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|e| Error::MalformedMessage(e.to_string()))?;
    let affine: AffinePoint = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or_else(|| Error::MalformedMessage("point is not on secp256k1".into()))?;
    if affine == AffinePoint::IDENTITY {
        return Err(Error::MalformedMessage("identity point".into()));
    }
    Ok(ProjectivePoint::from(affine))
}

pub(crate) fn decode_scalar(bytes: &[u8; 32]) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(bytes)))
        .ok_or_else(|| Error::MalformedMessage("scalar is not reduced".into()))
}

pub(crate) fn digest_scalar(digest: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use k256::elliptic_curve::Field;
    use rand::rngs::OsRng;

    fn random_point() -> [u8; 65] {
        encode_point(&(ProjectivePoint::GENERATOR * Scalar::random(&mut OsRng))).unwrap()
    }

    #[test]
    fn test_point_from_uncompressed() {
        let bytes = random_point();
        let key = ec_point_from_uncompressed(&bytes).unwrap();
        assert_eq!(key.to_uncompressed(), bytes);
        assert_eq!(&key.x()[..], &bytes[1..33]);
        assert_eq!(&key.y()[..], &bytes[33..]);
        assert!(matches!(key.to_compressed()[0], 0x02 | 0x03));
    }

    #[test]
    fn test_point_length_checked() {
        let bytes = random_point();
        assert!(matches!(
            ec_point_from_uncompressed(&bytes[..64]),
            Err(Error::InvalidPublicKey(_))
        ));
        let mut long = bytes.to_vec();
        long.push(0);
        assert!(matches!(
            ec_point_from_uncompressed(&long),
            Err(Error::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_point_tag_checked() {
        let mut bytes = random_point();
        bytes[0] = 0x02;
        assert!(matches!(
            ec_point_from_uncompressed(&bytes),
            Err(Error::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_point_off_curve() {
        let mut bytes = random_point();
        bytes[64] ^= 1;
        assert!(matches!(
            ec_point_from_uncompressed(&bytes),
            Err(Error::CurveConversion(_))
        ));
    }

    fn signed(digest: &[u8; 32]) -> (PublicKey, Signature) {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = PublicKey(k256::PublicKey::from(signing_key.verifying_key()));
        let signature = signing_key.sign_prehash_recoverable(digest).unwrap();
        (public_key, Signature::from(signature))
    }

    #[test]
    fn test_verify_signature_accepts_low_s() {
        let digest = message_digest(b"low s");
        let (public_key, signature) = signed(&digest);
        assert!(verify_signature(&public_key, &digest, &signature));
        assert!(!verify_signature(&public_key, &message_digest(b"other"), &signature));
    }

    #[test]
    fn test_verify_signature_accepts_high_s_with_flipped_parity() {
        let digest = message_digest(b"high s");
        let (public_key, signature) = signed(&digest);

        let s = decode_scalar(&signature.s).unwrap();
        let mut high = Signature::new(signature.v ^ 1, signature.r, [0u8; 32]);
        high.s.copy_from_slice(&(-s).to_bytes());
        assert!(verify_signature(&public_key, &digest, &high));

        // Parity must still match after normalization
        let unflipped = Signature::new(signature.v, high.r, high.s);
        assert!(!verify_signature(&public_key, &digest, &unflipped));
    }

    #[test]
    fn test_verify_signature_checks_recovery_byte() {
        let digest = message_digest(b"recovery");
        let (public_key, signature) = signed(&digest);
        for v in [signature.v ^ 1, signature.v ^ 2, 4, 27] {
            let tampered = Signature::new(v, signature.r, signature.s);
            assert!(!verify_signature(&public_key, &digest, &tampered), "v = {v}");
        }
    }

    #[test]
    fn test_digest_is_sha3() {
        // SHA3-256("")
        assert_eq!(
            hex::encode(message_digest(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_identity_rejected() {
        assert!(encode_point(&ProjectivePoint::IDENTITY).is_err());
        assert!(decode_point(&[0x00]).is_err());
        let point = random_point();
        assert_eq!(encode_point(&decode_point(&point).unwrap()).unwrap(), point);
    }

    #[test]
    fn test_decode_scalar_rejects_unreduced() {
        assert!(decode_scalar(&[0xff; 32]).is_err());
        assert_eq!(decode_scalar(&[0u8; 32]).unwrap(), Scalar::ZERO);
    }
}
