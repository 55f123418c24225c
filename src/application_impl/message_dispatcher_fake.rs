use crate::domain_model::{CredentialType, MemberId};
use crate::domain_port::{DispatchReceipt, MessageDispatcher, MessagingError};
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Always "sends" [`FakeMessageDispatcher::CODE`] and accepts it afterwards.
#[derive(Debug, Default)]
pub struct FakeMessageDispatcher {
    issued: DashSet<MemberId>,
    sent: AtomicUsize,
    failing: AtomicBool,
}

impl FakeMessageDispatcher {
    pub const CODE: &'static str = "123456";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MessageDispatcher for FakeMessageDispatcher {
    async fn send_verification_code(
        &self,
        member_id: MemberId,
        _operation_label: &str,
        _channel: CredentialType,
    ) -> Result<DispatchReceipt, MessagingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MessagingError::new(1, "gateway unavailable"));
        }
        self.issued.insert(member_id);
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(DispatchReceipt {
            code: Some(Self::CODE.to_string()),
        })
    }

    async fn compare_code(&self, member_id: MemberId, code: &str) -> Result<(), MessagingError> {
        if !self.issued.contains(&member_id) {
            return Err(MessagingError::new(1, "code expired"));
        }
        if code.trim() != Self::CODE {
            return Err(MessagingError::new(1, "code not correct"));
        }
        Ok(())
    }
}
