use passport::application_impl::*;
use passport::application_port::*;
use passport::domain_model::*;
use passport::domain_port::*;
use passport::infra_memory::*;
use passport::logger::*;
use std::sync::Arc;

// Walks one password reset through the in-memory backends.
// $ cargo run --bin passport_demo
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logger = Logger::new_bootstrap();

    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
    let store: Arc<dyn TtlStore> = Arc::new(MemoryTtlStore::new(clock.clone()));
    let identity = Arc::new(FakeIdentityResolver::new().with_member(
        CredentialKind::Phone,
        "13800000000",
        MemberId(1001),
    ));
    let registry = Arc::new(FakeRegistryReader::new());
    registry.set(ENABLE_DEBUG_MODE, "true");
    let mutator = Arc::new(FakePasswordMutator::new());
    let messaging = Arc::new(RealMessageDispatcher::new(
        store.clone(),
        Arc::new(LogCodeDeliverer),
        clock.clone(),
        b"demo-secret".to_vec(),
        600,
    ));

    let service = RealPassportService::new(
        identity,
        messaging,
        registry,
        mutator.clone(),
        store,
        clock.clone(),
        PassportConfig::default(),
    );

    let token = service.issue_token().await?;
    println!("token: {}", token);

    let sent = service
        .send_code(SendCodeInput {
            token: token.to_string(),
            operation: "0".into(),
            account: "13800000000".into(),
            credential_type: "2".into(),
        })
        .await?;
    let code = sent
        .debug_code
        .ok_or_else(|| anyhow::anyhow!("debug mode should echo the code"))?;
    println!("code echoed in debug mode: {}", code);

    let again = service
        .send_code(SendCodeInput {
            token: token.to_string(),
            operation: "0".into(),
            account: "13800000000".into(),
            credential_type: "2".into(),
        })
        .await;
    println!("immediate resend: {:?}", again.err());

    service
        .compare_code(CompareCodeInput {
            token: token.to_string(),
            account: "13800000000".into(),
            credential_type: "2".into(),
            code,
        })
        .await?;
    println!("verification: {:?}", service.get_verification(token.as_str()).await?);

    service
        .consume_verification(ConsumeInput {
            token: token.to_string(),
            kind: ConsumeKind::ResetPassword,
            new_password: "n3w-secret".into(),
            confirm_password: "n3w-secret".into(),
            old_password: None,
        })
        .await?;
    println!("password changes recorded: {}", mutator.call_count().await);
    println!("after consume: {:?}", service.get_verification(token.as_str()).await?);

    clock.advance(chrono::Duration::seconds(120));
    println!("resend allowed after 120s: {:?}", service.check_send_allowed(token.as_str()).await.is_ok());

    Ok(())
}
