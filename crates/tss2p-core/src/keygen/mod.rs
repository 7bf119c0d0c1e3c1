//! Key generation and key refresh
//!
//! Both flows drive a (validator, user) participant pair to completion and
//! package the two results as a [`KeysharePair`].

mod dkg;
mod key_refresh;
mod messages;

pub use dkg::DkgParticipant;
pub use key_refresh::RefreshParticipant;
pub use messages::{
    result_protocol, DkgOutput, DKG_ROUND1, DKG_ROUND2, REFRESH_ROUND1, REFRESH_ROUND2,
};

use crate::mpc::{ensure_roles, participant_result, run_protocol, Participant};
use crate::suite::ProtocolSuite;
use crate::{build_keyshare_pair, DriverConfig, KeysharePair, PartyOutput, Result, Role, Share};
use tracing::{info, instrument};

/// Run key generation between fresh validator and user participants
#[instrument(skip_all)]
pub fn run_keygen<S: ProtocolSuite>(suite: &S, config: &DriverConfig) -> Result<KeysharePair> {
    let mut validator = suite.keygen(Role::Validator)?;
    let mut user = suite.keygen(Role::User)?;
    let pair = collect_pair(&mut validator, &mut user, config)?;

    info!(
        public_key = hex::encode(pair.validator.public_key(suite)?),
        "Key generation completed successfully"
    );
    Ok(pair)
}

/// Drive a refresh pair and repackage both refreshed results
#[instrument(skip_all)]
pub fn run_refresh<S: ProtocolSuite>(
    suite: &S,
    validator: &mut S::Refresh,
    user: &mut S::Refresh,
    config: &DriverConfig,
) -> Result<KeysharePair> {
    let pair = collect_pair(validator, user, config)?;

    info!(
        public_key = hex::encode(pair.validator.public_key(suite)?),
        "Key refresh completed successfully"
    );
    Ok(pair)
}

/// Refresh a stored keyshare pair
///
/// The old shares stay usable until the caller discards them.
pub fn refresh_shares<S: ProtocolSuite>(
    suite: &S,
    validator_share: &Share,
    user_share: &Share,
    config: &DriverConfig,
) -> Result<KeysharePair> {
    let mut validator = validator_share.refresh_participant(suite)?;
    let mut user = user_share.refresh_participant(suite)?;
    run_refresh(suite, &mut validator, &mut user, config)
}

fn collect_pair<A, B>(validator: &mut A, user: &mut B, config: &DriverConfig) -> Result<KeysharePair>
where
    A: Participant,
    B: Participant,
{
    ensure_roles(&*validator, &*user)?;
    run_protocol(validator, user, config)?;
    build_keyshare_pair(
        PartyOutput::new(validator.role(), participant_result(&*validator)?),
        PartyOutput::new(user.role(), participant_result(&*user)?),
    )
}
