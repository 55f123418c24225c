use std::fmt;

/// Top-level grouping of TTL-store keys.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyNamespace {
    /// Verification record of the password / phone-binding flows, per token.
    Password,
    /// Registration token bookkeeping (send throttle, remembered code and phone), per token.
    Registration,
    /// Codes issued by the bundled messaging dispatcher, per member.
    MemberCode,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum KeyField {
    Record,
    LastTime,
    CheckCode,
    CheckPhone,
    CodeHash,
}

impl KeyNamespace {
    fn as_str(&self) -> &'static str {
        match self {
            KeyNamespace::Password => "pwd:token",
            KeyNamespace::Registration => "reg:token",
            KeyNamespace::MemberCode => "code:member",
        }
    }
}

impl KeyField {
    fn as_str(&self) -> &'static str {
        match self {
            KeyField::Record => "record",
            KeyField::LastTime => "last-time",
            KeyField::CheckCode => "reg_check_code",
            KeyField::CheckPhone => "reg_check_phone",
            KeyField::CodeHash => "hash",
        }
    }
}

/// `namespace:subject:field`. Store adapters add their own global prefix on top.
pub fn build_key(namespace: KeyNamespace, subject: &impl fmt::Display, field: KeyField) -> String {
    format!("{}:{}:{}", namespace.as_str(), subject, field.as_str())
}
