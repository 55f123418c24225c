use crate::domain_model::*;
use crate::domain_port::TtlStoreError;

#[derive(Debug, thiserror::Error)]
pub enum InvalidRequest {
    #[error("missing verification token")]
    MissingToken,
    #[error("incomplete information: account is required")]
    MissingAccount,
    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperation),
    #[error(transparent)]
    UnknownCredentialType(#[from] UnknownCredentialType),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum PasswordRule {
    #[error("old password is required")]
    OldPasswordRequired,
    #[error("new password is required")]
    NewPasswordRequired,
    #[error("the two passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum PassportError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidRequest),
    #[error("no such member")]
    NoSuchMember,
    #[error("resend too soon, wait before requesting another code")]
    Throttled,
    #[error("failed to send verification code: {0}")]
    SendFailed(String),
    #[error("{0}")]
    CodeMismatch(String),
    #[error("code not correct")]
    NotVerified,
    #[error(transparent)]
    Validation(#[from] PasswordRule),
    #[error("{0}")]
    MutationFailed(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TtlStoreError> for PassportError {
    fn from(err: TtlStoreError) -> Self {
        PassportError::Store(err.to_string())
    }
}

/// Fields are the raw request values; the service does all the checking.
#[derive(Debug, Clone)]
pub struct SendCodeInput {
    pub token: String,
    pub operation: String,
    pub account: String,
    pub credential_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct SendCodeResult {
    /// Only ever set while the registry debug flag is on.
    pub debug_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompareCodeInput {
    pub token: String,
    pub account: String,
    pub credential_type: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct ConsumeInput {
    pub token: String,
    pub kind: ConsumeKind,
    pub new_password: String,
    pub confirm_password: String,
    /// Ignored for [`ConsumeKind::ResetPassword`].
    pub old_password: Option<String>,
}

#[async_trait::async_trait]
pub trait PassportService: Send + Sync {
    /// Hand out a fresh token already known to the registration keyspace.
    async fn issue_token(&self) -> Result<PassportToken, PassportError>;

    async fn send_code(&self, input: SendCodeInput) -> Result<SendCodeResult, PassportError>;

    async fn compare_code(&self, input: CompareCodeInput) -> Result<(), PassportError>;

    async fn check_send_allowed(&self, token: &str) -> Result<(), PassportError>;

    async fn get_verification(&self, token: &str) -> Result<Verification, PassportError>;

    /// Spend a verified token on exactly one password mutation.
    async fn consume_verification(&self, input: ConsumeInput) -> Result<(), PassportError>;
}
