use sha2::{Digest, Sha256};
use std::fmt;

/// Irreversible fixed-length digest of a submitted password (lowercase hex SHA-256).
///
/// Passwords never leave the handler layer in plain text; equality of two
/// submissions is decided on digests.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn of(plain: &str) -> Self {
        let out = Sha256::digest(plain.trim().as_bytes());
        PasswordDigest(hex::encode(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Digests are credentials too.
impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordDigest(..)")
    }
}
