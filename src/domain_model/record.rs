use super::MemberId;
use serde::{Deserialize, Serialize};

/// Token-scoped verification state, stored as one value under one key so that
/// the verified flag and the bound member are always written together.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Time of the send that opened this record. Kept for diagnostics only;
    /// the resend throttle reads the registration keyspace.
    pub last_send_unix: Option<i64>,
    pub verified: bool,
    pub member_id: Option<MemberId>,
}

impl VerificationRecord {
    /// A fresh send: remembers the time and drops whatever was verified before.
    pub fn sent_at(unix: i64) -> Self {
        VerificationRecord {
            last_send_unix: Some(unix),
            verified: false,
            member_id: None,
        }
    }

    pub fn mark_verified(self, member_id: MemberId) -> Self {
        VerificationRecord {
            verified: true,
            member_id: Some(member_id),
            ..self
        }
    }

    /// The member this token may act for, if a code was accepted.
    pub fn verified_member(&self) -> Option<MemberId> {
        match (self.verified, self.member_id) {
            (true, Some(member_id)) => Some(member_id),
            _ => None,
        }
    }
}

/// Outcome of reading a token's verification state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Verification {
    pub member_id: MemberId,
    pub verified: bool,
}

impl Verification {
    pub fn unverified() -> Self {
        Verification {
            member_id: MemberId(0),
            verified: false,
        }
    }
}

impl From<&VerificationRecord> for Verification {
    fn from(record: &VerificationRecord) -> Self {
        match record.verified_member() {
            Some(member_id) => Verification {
                member_id,
                verified: true,
            },
            None => Verification::unverified(),
        }
    }
}
