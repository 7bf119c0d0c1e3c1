//! Signing message types

use crate::{Error, ProtocolMessage, Result, Signature};

/// Round 1 (validator to user): validator nonce point
pub const SIGN_ROUND1: &str = "tss2p/sign/round1";
/// Round 2 (user to validator): user nonce point
pub const SIGN_ROUND2: &str = "tss2p/sign/round2";
/// Round 3 (validator to user): partial signature
pub const SIGN_ROUND3: &str = "tss2p/sign/round3";
/// Signing result held by the user
pub const SIGNATURE_RESULT: &str = "tss2p/sign/signature";

pub(crate) const NONCE_POINT: &str = "nonce_point";
pub(crate) const PARTIAL: &str = "partial";
pub(crate) const NONCE_INVERSE: &str = "nonce_inverse";

/// Encode a finished signature as a result message
pub fn signature_message(signature: &Signature) -> ProtocolMessage {
    ProtocolMessage::new(SIGNATURE_RESULT)
        .with_payload("v", vec![signature.v])
        .with_payload("r", signature.r.to_vec())
        .with_payload("s", signature.s.to_vec())
}

/// Decode the signature from a signing result message
pub fn decode_signature(message: &ProtocolMessage) -> Result<Signature> {
    if !message.is(SIGNATURE_RESULT) {
        return Err(Error::MalformedMessage(format!(
            "expected {SIGNATURE_RESULT}, got {}",
            message.protocol
        )));
    }
    let [v] = message.fixed_payload::<1>("v")?;
    Ok(Signature::new(
        v,
        message.fixed_payload("r")?,
        message.fixed_payload("s")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_message_round_trip() {
        let signature = Signature::new(1, [2u8; 32], [3u8; 32]);
        let message = signature_message(&signature);
        assert_eq!(decode_signature(&message).unwrap(), signature);
    }

    #[test]
    fn test_decode_checks_protocol_and_widths() {
        let message = signature_message(&Signature::new(0, [1u8; 32], [1u8; 32]));

        let mut renamed = message.clone();
        renamed.protocol = SIGN_ROUND3.into();
        assert!(matches!(decode_signature(&renamed), Err(Error::MalformedMessage(_))));

        let short = message.with_payload("r", vec![1u8; 31]);
        assert!(matches!(decode_signature(&short), Err(Error::MalformedMessage(_))));
    }
}
