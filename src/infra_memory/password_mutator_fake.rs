use crate::domain_model::{MemberId, PasswordDigest};
use crate::domain_port::{MutationError, PasswordMutator};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MutationCall {
    pub member_id: MemberId,
    pub trade: bool,
    pub new: PasswordDigest,
    pub old: Option<PasswordDigest>,
}

/// Records every call; fails all of them while a failure message is set.
#[derive(Debug, Default)]
pub struct FakePasswordMutator {
    calls: Mutex<Vec<MutationCall>>,
    failure: Mutex<Option<String>>,
}

impl FakePasswordMutator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().await = message.map(str::to_owned);
    }

    pub async fn calls(&self) -> Vec<MutationCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn record(&self, call: MutationCall) -> Result<(), MutationError> {
        self.calls.lock().await.push(call);
        match self.failure.lock().await.as_ref() {
            Some(message) => Err(MutationError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl PasswordMutator for FakePasswordMutator {
    async fn change_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError> {
        self.record(MutationCall {
            member_id,
            trade: false,
            new: new.clone(),
            old: old.cloned(),
        })
        .await
    }

    async fn change_trade_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError> {
        self.record(MutationCall {
            member_id,
            trade: true,
            new: new.clone(),
            old: old.cloned(),
        })
        .await
    }
}
