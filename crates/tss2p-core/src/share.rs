//! Keyshare text codec
//!
//! A keyshare is stored as `<role>:<message>`, where `<message>` is the
//! encoded protocol result of that party's key generation or refresh.

use crate::keys::UNCOMPRESSED_POINT_LEN;
use crate::suite::ProtocolSuite;
use crate::{Error, ProtocolMessage, Result, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the role tag and the encoded message
pub const SHARE_SEPARATOR: char = ':';

/// One party's persisted keyshare
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Share {
    role: Role,
    text: String,
}

impl Share {
    /// Encode a protocol result for the given role
    pub fn encode(message: &ProtocolMessage, role: Role) -> Result<Self> {
        let encoded = message.encode()?;
        Ok(Self {
            role,
            text: format!("{role}{SHARE_SEPARATOR}{encoded}"),
        })
    }

    /// Validate keyshare text. The text is kept unchanged.
    pub fn decode(text: &str) -> Result<Self> {
        let separators = text.matches(SHARE_SEPARATOR).count();
        if separators != 1 {
            return Err(Error::MalformedShare(format!(
                "expected exactly one role separator, found {separators}"
            )));
        }
        let (tag, payload) = text
            .split_once(SHARE_SEPARATOR)
            .ok_or_else(|| Error::MalformedShare("missing role separator".into()))?;
        let role = Role::parse(tag)?;
        ProtocolMessage::decode(payload)?;
        Ok(Self {
            role,
            text: text.to_string(),
        })
    }

    /// Role this share belongs to
    pub fn role(&self) -> Role {
        self.role
    }

    /// Decode the protocol result carried by this share
    pub fn message(&self) -> Result<ProtocolMessage> {
        ProtocolMessage::decode(self.payload())
    }

    /// Uncompressed public key of the shared key
    pub fn public_key<S: ProtocolSuite>(&self, suite: &S) -> Result<[u8; UNCOMPRESSED_POINT_LEN]> {
        let message = self.message()?;
        suite.dkg_public_key(self.role, &message)
    }

    /// Signing participant bound to this share and `message`
    pub fn sign_participant<S: ProtocolSuite>(&self, suite: &S, message: &[u8]) -> Result<S::Sign> {
        suite.sign(self.role, &self.message()?, message)
    }

    /// Refresh participant bound to this share
    pub fn refresh_participant<S: ProtocolSuite>(&self, suite: &S) -> Result<S::Refresh> {
        suite.refresh(self.role, &self.message()?)
    }

    /// Full share text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn payload(&self) -> &str {
        // The role tag never contains the separator
        &self.text[self.role.as_str().len() + SHARE_SEPARATOR.len_utf8()..]
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Share {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Share::decode(s)
    }
}

impl TryFrom<String> for Share {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Share::decode(&value)
    }
}

impl From<Share> for String {
    fn from(share: Share) -> Self {
        share.text
    }
}

/// A party's completed protocol result, tagged with its role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyOutput {
    pub role: Role,
    pub message: ProtocolMessage,
}

impl PartyOutput {
    pub fn new(role: Role, message: ProtocolMessage) -> Self {
        Self { role, message }
    }
}

/// Validator and user shares produced by one key generation or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysharePair {
    pub validator: Share,
    pub user: Share,
}

impl KeysharePair {
    /// Share held by `role`
    pub fn get(&self, role: Role) -> &Share {
        match role {
            Role::Validator => &self.validator,
            Role::User => &self.user,
        }
    }
}

impl From<KeysharePair> for (Share, Share) {
    fn from(pair: KeysharePair) -> Self {
        (pair.validator, pair.user)
    }
}

/// Package two results as a (validator, user) pair, whatever the argument order
pub fn build_keyshare_pair(a: PartyOutput, b: PartyOutput) -> Result<KeysharePair> {
    let (validator, user) = match (a.role, b.role) {
        (Role::Validator, Role::User) => (a, b),
        (Role::User, Role::Validator) => (b, a),
        (role, _) => return Err(Error::DuplicateRole(role)),
    };
    Ok(KeysharePair {
        validator: Share::encode(&validator.message, Role::Validator)?,
        user: Share::encode(&user.message, Role::User)?,
    })
}
