//! Two-party signing
//!
//! Only the user-role participant ends up holding the signature; the
//! validator's result is never read.

mod dsg;
mod messages;

pub use dsg::SignParticipant;
pub use messages::{
    decode_signature, signature_message, SIGNATURE_RESULT, SIGN_ROUND1, SIGN_ROUND2, SIGN_ROUND3,
};

use crate::mpc::{ensure_roles, participant_result, run_protocol};
use crate::suite::ProtocolSuite;
use crate::{DriverConfig, Result, Share, Signature};
use tracing::{info, instrument};

/// Drive a signing pair and decode the user's signature
#[instrument(skip_all)]
pub fn run_sign<S: ProtocolSuite>(
    suite: &S,
    validator: &mut S::Sign,
    user: &mut S::Sign,
    config: &DriverConfig,
) -> Result<Signature> {
    ensure_roles(&*validator, &*user)?;
    run_protocol(validator, user, config)?;
    let signature = suite.decode_signature(&participant_result(&*user)?)?;

    info!(
        v = signature.v,
        r = hex::encode(signature.r),
        s = hex::encode(signature.s),
        "Signing completed successfully"
    );
    Ok(signature)
}

/// Sign `message` with a stored keyshare pair
pub fn sign_with_shares<S: ProtocolSuite>(
    suite: &S,
    validator_share: &Share,
    user_share: &Share,
    message: &[u8],
    config: &DriverConfig,
) -> Result<Signature> {
    let mut validator = validator_share.sign_participant(suite, message)?;
    let mut user = user_share.sign_participant(suite, message)?;
    run_sign(suite, &mut validator, &mut user, config)
}
