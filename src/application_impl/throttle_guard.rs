use super::{DurationPolicy, RegTokenStore};
use crate::application_port::PassportError;
use crate::domain_model::PassportToken;
use crate::domain_port::Clock;
use crate::logger::*;
use std::sync::Arc;

/// Decides whether another code may go out for a token.
///
/// Checking is read-only; a send is only recorded through [`ThrottleGuard::record_send`]
/// once the messaging side confirmed it.
pub struct ThrottleGuard {
    reg_tokens: RegTokenStore,
    policy: DurationPolicy,
    clock: Arc<dyn Clock>,
}

impl ThrottleGuard {
    pub fn new(reg_tokens: RegTokenStore, policy: DurationPolicy, clock: Arc<dyn Clock>) -> Self {
        ThrottleGuard {
            reg_tokens,
            policy,
            clock,
        }
    }

    pub async fn check_send_allowed(&self, token: &PassportToken) -> Result<(), PassportError> {
        let Some(last) = self.reg_tokens.last_send_unix(token).await? else {
            return Ok(());
        };
        let elapsed = self.clock.unix() - last;
        let interval = self.policy.resolve_resend_interval().await;
        if elapsed < interval {
            debug!(%token, elapsed, interval, "code send throttled");
            return Err(PassportError::Throttled);
        }
        Ok(())
    }

    pub async fn record_send(&self, token: &PassportToken, unix: i64) -> Result<(), PassportError> {
        self.reg_tokens.sign_check_code_send_ok(token, unix).await?;
        Ok(())
    }
}
