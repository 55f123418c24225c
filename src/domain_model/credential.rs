use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel a verification code travels through, as sent by clients in `type`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CredentialType {
    InSiteMessage = 1,
    Sms = 2,
    Email = 3,
}

/// Classification of the account string handed to the identity lookup.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CredentialKind {
    User,
    Phone,
    Email,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown credential type: {0:?}")]
pub struct UnknownCredentialType(pub String);

impl CredentialType {
    pub fn kind(&self) -> CredentialKind {
        match self {
            CredentialType::Email => CredentialKind::Email,
            CredentialType::Sms => CredentialKind::Phone,
            CredentialType::InSiteMessage => CredentialKind::User,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl std::str::FromStr for CredentialType {
    type Err = UnknownCredentialType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u8>() {
            Ok(1) => Ok(CredentialType::InSiteMessage),
            Ok(2) => Ok(CredentialType::Sms),
            Ok(3) => Ok(CredentialType::Email),
            _ => Err(UnknownCredentialType(s.to_owned())),
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialType::InSiteMessage => "in-site-message",
            CredentialType::Sms => "sms",
            CredentialType::Email => "email",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialKind::User => "user",
            CredentialKind::Phone => "phone",
            CredentialKind::Email => "email",
        };
        write!(f, "{}", name)
    }
}
