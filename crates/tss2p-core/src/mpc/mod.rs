//! Two-party protocol driver
//!
//! Both participants are advanced in-process, strictly alternating: the
//! first participant always consumes the message the second one produced in
//! the previous round, and vice versa. The very first call receives no
//! message. Completion is declared by the participants themselves; the
//! driver only enforces the round bound from [`DriverConfig`].

use crate::{DriverConfig, Error, ProtocolMessage, ProtocolVersion, Result, Role};
use tracing::{debug, info, instrument};

/// Whether a participant has more work to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Finished,
}

impl Status {
    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Finished)
    }
}

/// Outcome of one successful `advance` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Message for the other participant, if any
    pub outgoing: Option<ProtocolMessage>,
    pub status: Status,
}

impl Step {
    /// More rounds follow
    pub fn ongoing(outgoing: ProtocolMessage) -> Self {
        Self {
            outgoing: Some(outgoing),
            status: Status::Ongoing,
        }
    }

    /// This participant is done, optionally handing a last message over
    pub fn finished(outgoing: Option<ProtocolMessage>) -> Self {
        Self {
            outgoing,
            status: Status::Finished,
        }
    }
}

/// One side of an interactive two-party protocol
pub trait Participant {
    /// Error reported when the participant's state is invalid
    type Error: std::error::Error + Send + Sync + 'static;

    /// Role this participant plays
    fn role(&self) -> Role;

    /// Consume the peer's latest message and produce the next one
    fn advance(&mut self, incoming: Option<ProtocolMessage>) -> std::result::Result<Step, Self::Error>;

    /// Final result, available once the participant has finished
    fn result(&self, version: ProtocolVersion) -> std::result::Result<ProtocolMessage, Self::Error>;
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Number of rounds driven; each round advances both sides once
    pub rounds: usize,
}

/// Drive two participants until both report [`Status::Finished`]
///
/// The first error from either side aborts the run and is returned tagged
/// with that side's role; the other side is not advanced again.
#[instrument(skip_all, fields(first = %first.role(), second = %second.role(), max_rounds = config.max_rounds()))]
pub fn run_protocol<A, B>(first: &mut A, second: &mut B, config: &DriverConfig) -> Result<Completion>
where
    A: Participant,
    B: Participant,
{
    let mut message: Option<ProtocolMessage> = None;
    let mut first_status = Status::Ongoing;
    let mut second_status = Status::Ongoing;
    let mut rounds = 0;

    while !(first_status.is_finished() && second_status.is_finished()) {
        if rounds == config.max_rounds() {
            return Err(Error::ProtocolStalled { rounds });
        }
        rounds += 1;

        let step = first
            .advance(message)
            .map_err(|e| Error::protocol(first.role(), e))?;
        message = step.outgoing;
        first_status = step.status;

        let step = second
            .advance(message)
            .map_err(|e| Error::protocol(second.role(), e))?;
        message = step.outgoing;
        second_status = step.status;

        debug!(round = rounds, ?first_status, ?second_status, "Round completed");
    }

    info!(rounds, "Protocol finished");
    Ok(Completion { rounds })
}

/// Read a finished participant's result, tagging failures with its role
pub(crate) fn participant_result<P: Participant>(participant: &P) -> Result<ProtocolMessage> {
    participant
        .result(ProtocolVersion::CURRENT)
        .map_err(|e| Error::protocol(participant.role(), e))
}

/// Require an incoming message produced by the `protocol` step
pub(crate) fn expect_message(incoming: Option<ProtocolMessage>, protocol: &str) -> Result<ProtocolMessage> {
    let message = incoming.ok_or_else(|| Error::MissingMessage(protocol.to_string()))?;
    if !message.is(protocol) {
        return Err(Error::UnexpectedMessage(format!(
            "expected {protocol}, got {}",
            message.protocol
        )));
    }
    Ok(message)
}

/// Require that no message was delivered
pub(crate) fn expect_none(incoming: Option<ProtocolMessage>, state: &str) -> Result<()> {
    match incoming {
        None => Ok(()),
        Some(message) => Err(Error::UnexpectedMessage(format!(
            "{} while {state}",
            message.protocol
        ))),
    }
}

/// Check that participants were passed as (validator, user)
pub(crate) fn ensure_roles<A: Participant, B: Participant>(validator: &A, user: &B) -> Result<()> {
    for (expected, actual) in [(Role::Validator, validator.role()), (Role::User, user.role())] {
        if expected != actual {
            return Err(Error::RoleMismatch { expected, actual });
        }
    }
    Ok(())
}
