use crate::domain_model::{CredentialType, MemberId};

#[derive(Debug, Clone, Default)]
pub struct DispatchReceipt {
    /// The raw code, when the dispatcher is willing to disclose it.
    pub code: Option<String>,
}

/// Failure reported by the messaging side, with its own numeric code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct MessagingError {
    pub code: i32,
    pub message: String,
}

impl MessagingError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        MessagingError {
            code,
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Generate a code for `member_id` and deliver it over `channel`.
    async fn send_verification_code(
        &self,
        member_id: MemberId,
        operation_label: &str,
        channel: CredentialType,
    ) -> Result<DispatchReceipt, MessagingError>;

    /// Check `code` against the one last issued to `member_id`.
    async fn compare_code(&self, member_id: MemberId, code: &str) -> Result<(), MessagingError>;
}
