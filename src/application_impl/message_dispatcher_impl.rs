use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use hmac::{Hmac, KeyInit, Mac};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;

const CODE_LEN: usize = 6;
const DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// What is kept per member while a code is outstanding.
#[derive(Debug, Serialize, Deserialize)]
struct IssuedCode {
    hash: String,
    tries: u32,
    expire_at_unix: i64,
}

/// Issues numeric codes, keeps only their HMAC in the TTL store and hands the
/// plain code to a [`CodeDeliverer`]. Each code allows
/// [`MAX_CODE_ATTEMPTS`] wrong guesses before it is dropped.
pub struct RealMessageDispatcher {
    store: Arc<dyn TtlStore>,
    deliverer: Arc<dyn CodeDeliverer>,
    clock: Arc<dyn Clock>,
    hmac_key: Vec<u8>,
    code_ttl_secs: u64,
}

impl RealMessageDispatcher {
    pub fn new(
        store: Arc<dyn TtlStore>,
        deliverer: Arc<dyn CodeDeliverer>,
        clock: Arc<dyn Clock>,
        hmac_key: Vec<u8>,
        code_ttl_secs: u64,
    ) -> Self {
        Self {
            store,
            deliverer,
            clock,
            hmac_key,
            code_ttl_secs,
        }
    }

    fn hmac_hex(&self, code: &str) -> Result<String, MessagingError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.hmac_key)
            .map_err(|e| MessagingError::new(1, e.to_string()))?;
        mac.update(code.as_bytes());
        let out = mac.finalize().into_bytes();
        Ok(hex::encode(out))
    }

    fn key(member_id: MemberId) -> String {
        build_key(KeyNamespace::MemberCode, &member_id, KeyField::CodeHash)
    }

    fn store_error(e: TtlStoreError) -> MessagingError {
        warn!(error = %e, "code store failure");
        MessagingError::new(1, "verification code service unavailable")
    }

    async fn save(&self, key: &str, issued: &IssuedCode, ttl_secs: u64) -> Result<(), MessagingError> {
        let value = serde_json::to_string(issued).map_err(|e| MessagingError::new(1, e.to_string()))?;
        self.store
            .set_ex(key, &value, ttl_secs)
            .await
            .map_err(Self::store_error)
    }
}

#[async_trait::async_trait]
impl MessageDispatcher for RealMessageDispatcher {
    async fn send_verification_code(
        &self,
        member_id: MemberId,
        operation_label: &str,
        channel: CredentialType,
    ) -> Result<DispatchReceipt, MessagingError> {
        let code = nanoid!(CODE_LEN, &DIGITS);
        let issued = IssuedCode {
            hash: self.hmac_hex(&code)?,
            tries: MAX_CODE_ATTEMPTS,
            expire_at_unix: self.clock.unix() + self.code_ttl_secs as i64,
        };
        self.save(&Self::key(member_id), &issued, self.code_ttl_secs)
            .await?;

        let delivery = CodeDelivery {
            member_id,
            channel,
            operation: operation_label.to_owned(),
            code: code.clone(),
        };
        if let Err(e) = self.deliverer.deliver(&delivery).await {
            warn!(%member_id, %channel, error = %e, "code delivery failed");
            return Err(MessagingError::new(1, "failed to deliver verification code"));
        }
        Ok(DispatchReceipt { code: Some(code) })
    }

    async fn compare_code(&self, member_id: MemberId, code: &str) -> Result<(), MessagingError> {
        let key = Self::key(member_id);
        let stored = self
            .store
            .get(&key)
            .await
            .map_err(Self::store_error)?
            .ok_or_else(|| MessagingError::new(1, "code expired"))?;
        let mut issued: IssuedCode = match serde_json::from_str(&stored) {
            Ok(issued) => issued,
            Err(e) => {
                warn!(%member_id, error = %e, "unreadable issued code dropped");
                self.store.del(&key).await.map_err(Self::store_error)?;
                return Err(MessagingError::new(1, "code expired"));
            }
        };

        let provided = self.hmac_hex(code.trim())?;
        if provided == issued.hash {
            self.store.del(&key).await.map_err(Self::store_error)?;
            return Ok(());
        }

        issued.tries = issued.tries.saturating_sub(1);
        let remaining_secs = issued.expire_at_unix - self.clock.unix();
        if issued.tries == 0 || remaining_secs <= 0 {
            debug!(%member_id, "verification code attempts exhausted");
            self.store.del(&key).await.map_err(Self::store_error)?;
        } else {
            // keep the original deadline
            self.save(&key, &issued, remaining_secs as u64).await?;
        }
        Err(MessagingError::new(1, "code not correct"))
    }
}
