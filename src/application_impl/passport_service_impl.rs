use super::{DurationPolicy, RegTokenStore, ThrottleGuard, VerificationRecordStore};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use nanoid::nanoid;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PassportConfig {
    /// Lifetime of every token-scoped key, refreshed on each write.
    pub token_ttl_secs: u64,
    /// Resend interval used when the registry cannot tell.
    pub default_resend_interval_secs: i64,
}

impl Default for PassportConfig {
    fn default() -> Self {
        PassportConfig {
            token_ttl_secs: 600,
            default_resend_interval_secs: super::DEFAULT_RESEND_INTERVAL_SECS,
        }
    }
}

pub struct RealPassportService {
    identity: Arc<dyn IdentityResolver>,
    messaging: Arc<dyn MessageDispatcher>,
    registry: Arc<dyn RegistryReader>,
    mutator: Arc<dyn PasswordMutator>,
    records: VerificationRecordStore,
    reg_tokens: RegTokenStore,
    throttle: ThrottleGuard,
    clock: Arc<dyn Clock>,
}

impl RealPassportService {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        messaging: Arc<dyn MessageDispatcher>,
        registry: Arc<dyn RegistryReader>,
        mutator: Arc<dyn PasswordMutator>,
        store: Arc<dyn TtlStore>,
        clock: Arc<dyn Clock>,
        config: PassportConfig,
    ) -> Self {
        let records = VerificationRecordStore::new(store.clone(), config.token_ttl_secs);
        let reg_tokens = RegTokenStore::new(store, config.token_ttl_secs);
        let policy = DurationPolicy::new(registry.clone(), config.default_resend_interval_secs);
        let throttle = ThrottleGuard::new(reg_tokens.clone(), policy, clock.clone());
        Self {
            identity,
            messaging,
            registry,
            mutator,
            records,
            reg_tokens,
            throttle,
            clock,
        }
    }

    fn parse_token(raw: &str) -> Result<PassportToken, PassportError> {
        PassportToken::parse(raw).ok_or(PassportError::InvalidRequest(InvalidRequest::MissingToken))
    }

    fn parse_basis(account: &str, credential_type: &str) -> Result<(String, CredentialType), InvalidRequest> {
        let channel = credential_type.parse::<CredentialType>()?;
        let account = account.trim();
        if account.is_empty() {
            return Err(InvalidRequest::MissingAccount);
        }
        Ok((account.to_owned(), channel))
    }

    async fn resolve_member(&self, channel: CredentialType, account: &str) -> Result<MemberId, PassportError> {
        let kind = channel.kind();
        let member_id = self
            .identity
            .resolve_member_id(kind, account)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, %kind, "member lookup failed");
                MemberId(0)
            });
        if !member_id.is_valid() {
            return Err(PassportError::NoSuchMember);
        }
        Ok(member_id)
    }

    /// Echoing codes back is for test setups only; any doubt means off.
    async fn debug_mode(&self) -> bool {
        match self.registry.get_settings(&[ENABLE_DEBUG_MODE]).await {
            Ok(settings) => settings
                .get(ENABLE_DEBUG_MODE)
                .is_some_and(|v| v.trim() == "true"),
            Err(e) => {
                warn!(error = %e, "debug flag unavailable");
                false
            }
        }
    }

    async fn load_verification(&self, token: &PassportToken) -> Result<Verification, PassportError> {
        Ok(self
            .records
            .load(token)
            .await?
            .as_ref()
            .map(Verification::from)
            .unwrap_or_else(Verification::unverified))
    }
}

fn check_password_rules(
    kind: ConsumeKind,
    old: &str,
    new: &str,
    new_digest: &PasswordDigest,
    confirm_digest: &PasswordDigest,
) -> Result<(), PasswordRule> {
    if kind.requires_old_password() && old.trim().is_empty() {
        return Err(PasswordRule::OldPasswordRequired);
    }
    if new.trim().is_empty() {
        return Err(PasswordRule::NewPasswordRequired);
    }
    if new_digest != confirm_digest {
        return Err(PasswordRule::PasswordMismatch);
    }
    Ok(())
}

#[async_trait::async_trait]
impl PassportService for RealPassportService {
    async fn issue_token(&self) -> Result<PassportToken, PassportError> {
        let raw = nanoid!(10);
        let token = Self::parse_token(&raw)?;
        self.reg_tokens.register(&token).await?;
        Ok(token)
    }

    async fn send_code(&self, input: SendCodeInput) -> Result<SendCodeResult, PassportError> {
        let token = Self::parse_token(&input.token)?;
        let operation = input
            .operation
            .parse::<Operation>()
            .map_err(InvalidRequest::from)?;
        let (account, channel) = Self::parse_basis(&input.account, &input.credential_type)?;

        let member_id = self.resolve_member(channel, &account).await?;

        self.throttle.check_send_allowed(&token).await?;

        let receipt = self
            .messaging
            .send_verification_code(member_id, operation.label(), channel)
            .await
            .map_err(|e| {
                warn!(%member_id, code = e.code, error = %e, "sending verification code failed");
                PassportError::SendFailed(e.message)
            })?;

        let now = self.clock.unix();
        self.throttle.record_send(&token, now).await?;
        self.records
            .save(&token, &VerificationRecord::sent_at(now))
            .await?;
        info!(%member_id, ?operation, %channel, "verification code sent");

        let debug_code = match receipt.code {
            Some(code) if !code.is_empty() && self.debug_mode().await => Some(code),
            _ => None,
        };
        Ok(SendCodeResult { debug_code })
    }

    async fn compare_code(&self, input: CompareCodeInput) -> Result<(), PassportError> {
        let token = Self::parse_token(&input.token)?;
        let (account, channel) = Self::parse_basis(&input.account, &input.credential_type)?;

        let member_id = self.resolve_member(channel, &account).await?;

        self.messaging
            .compare_code(member_id, &input.code)
            .await
            .map_err(|e| {
                debug!(%member_id, error = %e, "verification code rejected");
                PassportError::CodeMismatch(e.message)
            })?;

        let record = self
            .records
            .load(&token)
            .await?
            .unwrap_or_default()
            .mark_verified(member_id);
        self.records.save(&token, &record).await?;
        info!(%member_id, "verification code accepted");
        Ok(())
    }

    async fn check_send_allowed(&self, token: &str) -> Result<(), PassportError> {
        let token = Self::parse_token(token)?;
        self.throttle.check_send_allowed(&token).await
    }

    async fn get_verification(&self, token: &str) -> Result<Verification, PassportError> {
        let token = Self::parse_token(token)?;
        self.load_verification(&token).await
    }

    async fn consume_verification(&self, input: ConsumeInput) -> Result<(), PassportError> {
        let token = Self::parse_token(&input.token)?;
        let verification = self.load_verification(&token).await?;
        if !verification.verified {
            return Err(PassportError::NotVerified);
        }
        let member_id = verification.member_id;

        let old_plain = input.old_password.as_deref().unwrap_or_default();
        let old = PasswordDigest::of(old_plain);
        let new = PasswordDigest::of(&input.new_password);
        let confirm = PasswordDigest::of(&input.confirm_password);
        check_password_rules(input.kind, old_plain, &input.new_password, &new, &confirm)?;

        let result = match input.kind {
            ConsumeKind::ResetPassword => self.mutator.change_password(member_id, &new, None).await,
            ConsumeKind::ModifyPassword => {
                self.mutator
                    .change_password(member_id, &new, Some(&old))
                    .await
            }
            ConsumeKind::ModifyTradePassword => {
                self.mutator
                    .change_trade_password(member_id, &new, Some(&old))
                    .await
            }
        };
        result.map_err(|e| {
            warn!(%member_id, kind = ?input.kind, error = %e, "password change failed");
            PassportError::MutationFailed(e.to_string())
        })?;

        self.records.clear(&token).await?;
        info!(%member_id, kind = ?input.kind, "verified token consumed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::FakeMessageDispatcher;
    use crate::infra_memory::*;
    use chrono::Duration;

    const MEMBER: MemberId = MemberId(1001);

    struct Harness {
        clock: Arc<ManualClock>,
        registry: Arc<FakeRegistryReader>,
        messaging: Arc<FakeMessageDispatcher>,
        mutator: Arc<FakePasswordMutator>,
        service: RealPassportService,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = Arc::new(MemoryTtlStore::new(clock.clone()));
        let identity = Arc::new(
            FakeIdentityResolver::new()
                .with_member(CredentialKind::Phone, "user1", MEMBER)
                .with_member(CredentialKind::Email, "user1@example.com", MEMBER),
        );
        let registry = Arc::new(FakeRegistryReader::new());
        let messaging = Arc::new(FakeMessageDispatcher::new());
        let mutator = Arc::new(FakePasswordMutator::new());
        let service = RealPassportService::new(
            identity,
            messaging.clone(),
            registry.clone(),
            mutator.clone(),
            store,
            clock.clone(),
            PassportConfig::default(),
        );
        Harness {
            clock,
            registry,
            messaging,
            mutator,
            service,
        }
    }

    fn send_input(token: &str, account: &str) -> SendCodeInput {
        SendCodeInput {
            token: token.to_string(),
            operation: "1".to_string(),
            account: account.to_string(),
            credential_type: "2".to_string(),
        }
    }

    fn compare_input(token: &str, code: &str) -> CompareCodeInput {
        CompareCodeInput {
            token: token.to_string(),
            account: "user1".to_string(),
            credential_type: "2".to_string(),
            code: code.to_string(),
        }
    }

    fn reset_input(token: &str, pwd: &str, repwd: &str) -> ConsumeInput {
        ConsumeInput {
            token: token.to_string(),
            kind: ConsumeKind::ResetPassword,
            new_password: pwd.to_string(),
            confirm_password: repwd.to_string(),
            old_password: None,
        }
    }

    async fn verified(h: &Harness, token: &str) {
        h.service.send_code(send_input(token, "user1")).await.unwrap();
        h.service
            .compare_code(compare_input(token, FakeMessageDispatcher::CODE))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn second_send_within_interval_is_throttled() {
        let h = harness();
        h.service.send_code(send_input("t1", "user1")).await.unwrap();

        let err = h.service.send_code(send_input("t1", "user1")).await.unwrap_err();
        assert!(matches!(err, PassportError::Throttled));
        assert_eq!(h.messaging.sent_count(), 1);

        h.clock.advance(Duration::seconds(120));
        h.service.send_code(send_input("t1", "user1")).await.unwrap();
        assert_eq!(h.messaging.sent_count(), 2);
    }

    #[tokio::test]
    async fn registry_interval_overrides_default() {
        let h = harness();
        h.registry.set(SMS_SEND_DURATION, "10");
        h.service.send_code(send_input("t1", "user1")).await.unwrap();

        h.clock.advance(Duration::seconds(9));
        assert!(matches!(
            h.service.check_send_allowed("t1").await,
            Err(PassportError::Throttled)
        ));
        h.clock.advance(Duration::seconds(1));
        assert!(h.service.check_send_allowed("t1").await.is_ok());
    }

    #[tokio::test]
    async fn throttle_is_per_token() {
        let h = harness();
        h.service.send_code(send_input("t1", "user1")).await.unwrap();
        h.service.send_code(send_input("t2", "user1")).await.unwrap();
        assert!(h.service.check_send_allowed("t3").await.is_ok());
    }

    #[tokio::test]
    async fn compare_success_binds_member_to_token() {
        let h = harness();
        verified(&h, "t1").await;

        let verification = h.service.get_verification("t1").await.unwrap();
        assert_eq!(
            verification,
            Verification {
                member_id: MEMBER,
                verified: true
            }
        );
        assert!(!h.service.get_verification("t2").await.unwrap().verified);
    }

    #[tokio::test]
    async fn wrong_code_is_a_mismatch_and_leaves_token_unverified() {
        let h = harness();
        h.service.send_code(send_input("t1", "user1")).await.unwrap();

        let err = h
            .service
            .compare_code(compare_input("t1", "000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, PassportError::CodeMismatch(msg) if msg == "code not correct"));
        assert!(!h.service.get_verification("t1").await.unwrap().verified);
    }

    #[tokio::test]
    async fn compare_is_not_throttled() {
        let h = harness();
        h.service.send_code(send_input("t1", "user1")).await.unwrap();
        for _ in 0..3 {
            let _ = h.service.compare_code(compare_input("t1", "999999")).await;
        }
        h.service
            .compare_code(compare_input("t1", FakeMessageDispatcher::CODE))
            .await
            .unwrap();
        assert!(h.service.get_verification("t1").await.unwrap().verified);
    }

    #[tokio::test]
    async fn consume_without_compare_is_not_verified() {
        let h = harness();
        h.service.send_code(send_input("t1", "user1")).await.unwrap();

        for token in ["t1", "never-used"] {
            let err = h
                .service
                .consume_verification(reset_input(token, "abc", "abc"))
                .await
                .unwrap_err();
            assert!(matches!(err, PassportError::NotVerified));
        }
        assert_eq!(h.mutator.call_count().await, 0);
    }

    #[tokio::test]
    async fn mismatched_passwords_never_reach_mutator() {
        let h = harness();
        verified(&h, "t1").await;

        let err = h
            .service
            .consume_verification(reset_input("t1", "abc", "xyz"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PassportError::Validation(PasswordRule::PasswordMismatch)
        ));
        assert_eq!(h.mutator.call_count().await, 0);
        assert!(h.service.get_verification("t1").await.unwrap().verified);
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_mutation() {
        let h = harness();
        verified(&h, "t1").await;

        let err = h
            .service
            .consume_verification(reset_input("t1", "  ", "  "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PassportError::Validation(PasswordRule::NewPasswordRequired)
        ));

        let modify = ConsumeInput {
            kind: ConsumeKind::ModifyTradePassword,
            old_password: Some(String::new()),
            ..reset_input("t1", "abc", "abc")
        };
        let err = h.service.consume_verification(modify).await.unwrap_err();
        assert!(matches!(
            err,
            PassportError::Validation(PasswordRule::OldPasswordRequired)
        ));
        assert_eq!(h.mutator.call_count().await, 0);
    }

    #[tokio::test]
    async fn successful_consume_is_single_use() {
        let h = harness();
        verified(&h, "t1").await;

        h.service
            .consume_verification(reset_input("t1", "abc", "abc"))
            .await
            .unwrap();
        let calls = h.mutator.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].member_id, MEMBER);
        assert_eq!(calls[0].new, PasswordDigest::of("abc"));
        assert_eq!(calls[0].old, None);
        assert!(!calls[0].trade);

        let err = h
            .service
            .consume_verification(reset_input("t1", "abc", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, PassportError::NotVerified));
        assert_eq!(h.mutator.call_count().await, 1);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_token_verified_for_retry() {
        let h = harness();
        verified(&h, "t1").await;
        h.mutator.fail_with(Some("password service down")).await;

        let err = h
            .service
            .consume_verification(reset_input("t1", "abc", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, PassportError::MutationFailed(msg) if msg == "password service down"));
        assert!(h.service.get_verification("t1").await.unwrap().verified);

        h.mutator.fail_with(None).await;
        h.service
            .consume_verification(reset_input("t1", "abc", "abc"))
            .await
            .unwrap();
        assert_eq!(h.mutator.call_count().await, 2);
    }

    #[tokio::test]
    async fn trade_password_flow_passes_old_digest() {
        let h = harness();
        verified(&h, "t1").await;

        let input = ConsumeInput {
            kind: ConsumeKind::ModifyTradePassword,
            old_password: Some("old".to_string()),
            ..reset_input("t1", "new", "new")
        };
        h.service.consume_verification(input).await.unwrap();

        let calls = h.mutator.calls().await;
        assert!(calls[0].trade);
        assert_eq!(calls[0].old, Some(PasswordDigest::of("old")));
    }

    #[tokio::test]
    async fn modify_password_flow_passes_old_digest_to_login_column() {
        let h = harness();
        verified(&h, "t1").await;

        let input = ConsumeInput {
            kind: ConsumeKind::ModifyPassword,
            old_password: Some("old".to_string()),
            ..reset_input("t1", "new", "new")
        };
        h.service.consume_verification(input).await.unwrap();

        let calls = h.mutator.calls().await;
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].trade);
        assert_eq!(calls[0].member_id, MEMBER);
        assert_eq!(calls[0].new, PasswordDigest::of("new"));
        assert_eq!(calls[0].old, Some(PasswordDigest::of("old")));
        assert!(!h.service.get_verification("t1").await.unwrap().verified);
    }

    #[tokio::test]
    async fn unknown_member_fails_without_arming_throttle() {
        let h = harness();
        let err = h
            .service
            .send_code(send_input("t1", "nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, PassportError::NoSuchMember));
        assert!(h.service.check_send_allowed("t1").await.is_ok());
        assert_eq!(h.messaging.sent_count(), 0);
    }

    #[tokio::test]
    async fn failed_dispatch_does_not_arm_throttle() {
        let h = harness();
        h.messaging.fail_sends(true);

        let err = h.service.send_code(send_input("t1", "user1")).await.unwrap_err();
        assert!(matches!(err, PassportError::SendFailed(_)));
        assert!(h.service.check_send_allowed("t1").await.is_ok());

        h.messaging.fail_sends(false);
        h.service.send_code(send_input("t1", "user1")).await.unwrap();
    }

    #[tokio::test]
    async fn fresh_send_invalidates_earlier_verification() {
        let h = harness();
        verified(&h, "t1").await;

        h.clock.advance(Duration::seconds(120));
        h.service.send_code(send_input("t1", "user1")).await.unwrap();
        assert!(!h.service.get_verification("t1").await.unwrap().verified);
    }

    #[tokio::test]
    async fn verification_expires_after_ttl() {
        let h = harness();
        verified(&h, "t1").await;

        h.clock.advance(Duration::seconds(599));
        assert!(h.service.get_verification("t1").await.unwrap().verified);
        h.clock.advance(Duration::seconds(1));
        assert!(!h.service.get_verification("t1").await.unwrap().verified);
        assert!(h.service.check_send_allowed("t1").await.is_ok());
    }

    #[tokio::test]
    async fn debug_code_needs_registry_flag() {
        let h = harness();
        let result = h.service.send_code(send_input("t1", "user1")).await.unwrap();
        assert_eq!(result.debug_code, None);

        h.registry.set(ENABLE_DEBUG_MODE, "true");
        let result = h.service.send_code(send_input("t2", "user1")).await.unwrap();
        assert_eq!(result.debug_code.as_deref(), Some(FakeMessageDispatcher::CODE));

        h.registry.set_unavailable(true);
        let result = h.service.send_code(send_input("t3", "user1")).await.unwrap();
        assert_eq!(result.debug_code, None);
    }

    #[tokio::test]
    async fn malformed_requests_never_reach_collaborators() {
        let h = harness();
        let cases = [
            send_input("  ", "user1"),
            send_input("t1", " "),
            SendCodeInput {
                credential_type: "9".to_string(),
                ..send_input("t1", "user1")
            },
            SendCodeInput {
                operation: "7".to_string(),
                ..send_input("t1", "user1")
            },
        ];
        for input in cases {
            let err = h.service.send_code(input).await.unwrap_err();
            assert!(matches!(err, PassportError::InvalidRequest(_)));
        }
        assert_eq!(h.messaging.sent_count(), 0);

        let err = h
            .service
            .consume_verification(reset_input("", "abc", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PassportError::InvalidRequest(InvalidRequest::MissingToken)
        ));
    }

    #[tokio::test]
    async fn email_channel_resolves_email_credential() {
        let h = harness();
        let input = SendCodeInput {
            credential_type: "3".to_string(),
            ..send_input("t1", "user1@example.com")
        };
        h.service.send_code(input).await.unwrap();

        let err = h
            .service
            .send_code(send_input("t2", "user1@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, PassportError::NoSuchMember));
    }

    #[tokio::test]
    async fn issued_token_is_registered_and_sendable() {
        let h = harness();
        let token = h.service.issue_token().await.unwrap();
        assert_eq!(token.as_str().len(), 10);
        assert!(h.service.check_send_allowed(token.as_str()).await.is_ok());
        h.service
            .send_code(send_input(token.as_str(), "user1"))
            .await
            .unwrap();
    }
}
