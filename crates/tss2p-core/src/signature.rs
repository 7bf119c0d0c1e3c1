//! Fixed-layout ECDSA signature codec
//!
//! Wire layout is 66 bytes: `[v:1][r:32][pad:1][s:32]`, with `r` and `s`
//! big-endian and left-padded with zeros. `s` is right-aligned in the 33-byte
//! field after `r`, so the pad byte at offset 33 is its zero high byte.

use crate::{Error, Result};
use k256::ecdsa::{self, RecoveryId};
use serde::{Deserialize, Serialize};

/// Serialized signature length
pub const SIGNATURE_LEN: usize = 66;

/// Offset of the zero byte between `r` and `s`
pub const PAD_OFFSET: usize = 33;

/// ECDSA signature with recovery information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery byte
    pub v: u8,
    /// R component, big-endian
    pub r: [u8; 32],
    /// S component, big-endian
    pub s: [u8; 32],
}

impl Signature {
    /// Create a new signature
    pub fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }

    /// Build from big-endian magnitudes of any width.
    ///
    /// `v` is truncated to its low byte. Leading zeros in `r` and `s` are
    /// ignored; anything wider than 32 significant bytes is rejected.
    pub fn from_be_components(v: u32, r: &[u8], s: &[u8]) -> Result<Self> {
        Ok(Self {
            v: v as u8,
            r: left_pad("r", r)?,
            s: left_pad("s", s)?,
        })
    }

    /// Serialize to the 66-byte wire layout
    pub fn serialize(&self) -> [u8; SIGNATURE_LEN] {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[0] = self.v;
        bytes[1..PAD_OFFSET].copy_from_slice(&self.r);
        bytes[PAD_OFFSET + 1..].copy_from_slice(&self.s);
        bytes
    }

    /// Alias for [`Signature::serialize`]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.serialize()
    }

    /// Deserialize from the 66-byte wire layout
    ///
    /// A nonzero pad byte means `s` needs 33 bytes and is rejected with
    /// [`Error::SignatureComponentTooLarge`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(Error::MalformedSignature { len: bytes.len() });
        }
        Ok(Self {
            v: bytes[0],
            r: left_pad("r", &bytes[1..PAD_OFFSET])?,
            s: left_pad("s", &bytes[PAD_OFFSET..])?,
        })
    }

    /// Convert to a k256 signature, failing if `r` or `s` is out of range
    pub fn to_ecdsa(&self) -> Result<ecdsa::Signature> {
        ecdsa::Signature::from_scalars(
            *k256::FieldBytes::from_slice(&self.r),
            *k256::FieldBytes::from_slice(&self.s),
        )
        .map_err(|e| Error::Crypto(e.to_string()))
    }

    /// Recovery identifier, if `v` is a valid one
    pub fn recovery_id(&self) -> Option<RecoveryId> {
        RecoveryId::from_byte(self.v)
    }
}

impl From<(ecdsa::Signature, RecoveryId)> for Signature {
    fn from((signature, recovery_id): (ecdsa::Signature, RecoveryId)) -> Self {
        let (r, s) = signature.split_bytes();
        let mut out = Signature::new(recovery_id.to_byte(), [0u8; 32], [0u8; 32]);
        out.r.copy_from_slice(&r);
        out.s.copy_from_slice(&s);
        out
    }
}

fn left_pad(component: &'static str, bytes: &[u8]) -> Result<[u8; 32]> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[start..];
    if significant.len() > 32 {
        return Err(Error::SignatureComponentTooLarge {
            component,
            len: significant.len(),
        });
    }
    let mut out = [0u8; 32];
    out[32 - significant.len()..].copy_from_slice(significant);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut r = [0u8; 32];
        r[31] = 7;
        let sig = Signature::new(1, r, [0xab; 32]);
        let bytes = sig.serialize();
        assert_eq!(bytes.len(), SIGNATURE_LEN);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[32], 7);
        assert_eq!(bytes[PAD_OFFSET], 0);
        assert!(bytes[PAD_OFFSET + 1..].iter().all(|b| *b == 0xab));
        assert_eq!(Signature::deserialize(&bytes).unwrap(), sig);
        assert_eq!(sig.to_bytes(), bytes);
    }

    #[test]
    fn test_pad_byte_must_be_zero() {
        let mut bytes = Signature::new(0, [0x11; 32], [0x22; 32]).serialize();
        bytes[PAD_OFFSET] = 1;
        assert!(matches!(
            Signature::deserialize(&bytes),
            Err(Error::SignatureComponentTooLarge { component: "s", len: 33 })
        ));
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        for len in [0, 64, 65, 67, 100] {
            assert!(matches!(
                Signature::deserialize(&vec![0u8; len]),
                Err(Error::MalformedSignature { len: l }) if l == len
            ));
        }
    }

    #[test]
    fn test_all_zero_buffer() {
        let sig = Signature::deserialize(&[0u8; SIGNATURE_LEN]).unwrap();
        assert_eq!(sig, Signature::new(0, [0u8; 32], [0u8; 32]));
    }

    #[test]
    fn test_short_components_are_left_padded() {
        let sig = Signature::from_be_components(27, &[0x01, 0x02], &[0x03]).unwrap();
        let bytes = sig.serialize();
        assert_eq!(bytes[0], 27);
        assert_eq!(&bytes[31..33], &[0x01, 0x02]);
        assert_eq!(bytes[65], 0x03);
        assert!(bytes[1..31].iter().all(|b| *b == 0));
        assert!(bytes[PAD_OFFSET..65].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_v_is_truncated() {
        let sig = Signature::from_be_components(0x1_01, &[1], &[1]).unwrap();
        assert_eq!(sig.v, 1);
    }

    #[test]
    fn test_oversized_components_rejected() {
        let mut wide = vec![0u8; 33];
        wide[0] = 1;
        assert!(matches!(
            Signature::from_be_components(0, &wide, &[1]),
            Err(Error::SignatureComponentTooLarge { component: "r", len: 33 })
        ));
        assert!(matches!(
            Signature::from_be_components(0, &[1], &wide),
            Err(Error::SignatureComponentTooLarge { component: "s", len: 33 })
        ));

        // Leading zeros do not count
        let mut padded = vec![0u8; 40];
        padded[39] = 9;
        let sig = Signature::from_be_components(0, &padded, &padded).unwrap();
        assert_eq!(sig.r[31], 9);
    }

    #[test]
    fn test_zero_scalars_are_not_ecdsa() {
        let sig = Signature::new(0, [0u8; 32], [0u8; 32]);
        assert!(matches!(sig.to_ecdsa(), Err(Error::Crypto(_))));
        assert!(sig.recovery_id().is_some());
        assert!(Signature::new(4, [0u8; 32], [0u8; 32]).recovery_id().is_none());
    }
}
