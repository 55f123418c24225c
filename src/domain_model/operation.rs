use serde::{Deserialize, Serialize};

/// What the code being sent will authorize, as sent by clients in `op`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Operation {
    RecoverPassword = 0,
    ResetPassword = 1,
    BindPhone = 2,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown operation: {0:?}")]
pub struct UnknownOperation(pub String);

impl Operation {
    /// Human-readable label the messaging side puts into the message body.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::RecoverPassword => "recover password",
            Operation::ResetPassword => "reset password",
            Operation::BindPhone => "bind phone",
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u8>() {
            Ok(0) => Ok(Operation::RecoverPassword),
            Ok(1) => Ok(Operation::ResetPassword),
            Ok(2) => Ok(Operation::BindPhone),
            _ => Err(UnknownOperation(s.to_owned())),
        }
    }
}

/// The three mutations a verified token may authorize.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ConsumeKind {
    ResetPassword,
    ModifyPassword,
    ModifyTradePassword,
}

impl ConsumeKind {
    pub fn requires_old_password(&self) -> bool {
        !matches!(self, ConsumeKind::ResetPassword)
    }
}
