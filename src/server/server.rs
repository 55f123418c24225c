use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_kafka::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use nanoid::nanoid;
use sqlx::{MySql, Pool};
use std::sync::Arc;

const DEFAULT_CODE_TOPIC: &str = "passport.code";

pub struct Server {
    pub passport_service: Arc<dyn PassportService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let alphabet: [char; 16] = [
            '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'b', 'c', 'd', 'e', 'f',
        ];
        let run_id = nanoid!(10, &alphabet);

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let store: Arc<dyn TtlStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryTtlStore::new(clock.clone())),
            "redis" => {
                let redis = settings
                    .redis
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("store backend is redis but [redis] is missing"))?;
                let redis_client = redis::Client::open(redis.dsn.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisTtlStore::new(redis_manager, redis.prefix.clone()))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let needs_mysql = [&settings.identity, &settings.registry, &settings.password]
            .iter()
            .any(|b| b.backend == "real");
        let pool = if needs_mysql {
            let mysql = settings
                .mysql
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("a real backend needs [mysql]"))?;
            Some(Pool::<MySql>::connect(&mysql.dsn).await?)
        } else {
            None
        };
        let require_pool = || {
            pool.clone()
                .ok_or_else(|| anyhow::anyhow!("mysql pool not configured"))
        };

        let identity: Arc<dyn IdentityResolver> = match settings.identity.backend.as_str() {
            "fake" => Arc::new(FakeIdentityResolver::accepting_any()),
            "real" => Arc::new(MySqlIdentityResolver::new(require_pool()?)),
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        let registry: Arc<dyn RegistryReader> = match settings.registry.backend.as_str() {
            "fake" => Arc::new(FakeRegistryReader::new()),
            "real" => Arc::new(MySqlRegistryReader::new(require_pool()?)),
            other => return Err(anyhow::anyhow!("Unknown registry backend: {}", other)),
        };

        let mutator: Arc<dyn PasswordMutator> = match settings.password.backend.as_str() {
            "fake" => Arc::new(FakePasswordMutator::new()),
            "real" => {
                let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
                Arc::new(MySqlPasswordMutator::new(require_pool()?, credential_hasher))
            }
            other => return Err(anyhow::anyhow!("Unknown password backend: {}", other)),
        };

        let messaging_settings = &settings.messaging;
        let messaging: Arc<dyn MessageDispatcher> = match messaging_settings.backend.as_str() {
            "fake" => Arc::new(FakeMessageDispatcher::new()),
            "real" => {
                if messaging_settings.hmac_secret.is_empty() {
                    return Err(anyhow::anyhow!("messaging.hmac_secret must be set"));
                }
                let deliverer: Arc<dyn CodeDeliverer> =
                    match messaging_settings.deliverer.as_str() {
                        "log" => Arc::new(LogCodeDeliverer),
                        "kafka" => {
                            let brokers = messaging_settings
                                .kafka_brokers
                                .as_deref()
                                .ok_or_else(|| anyhow::anyhow!("messaging.kafka_brokers must be set"))?;
                            let topic = messaging_settings
                                .kafka_topic
                                .as_deref()
                                .unwrap_or(DEFAULT_CODE_TOPIC);
                            Arc::new(KafkaCodeDeliverer::new(
                                brokers,
                                &format!("passport-{}", run_id),
                                topic,
                            )?)
                        }
                        other => return Err(anyhow::anyhow!("Unknown code deliverer: {}", other)),
                    };
                Arc::new(RealMessageDispatcher::new(
                    store.clone(),
                    deliverer,
                    clock.clone(),
                    messaging_settings.hmac_secret.clone().into_bytes(),
                    messaging_settings.code_ttl_secs,
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown messaging backend: {}", other)),
        };

        let config = PassportConfig {
            token_ttl_secs: settings.passport.token_ttl_secs,
            default_resend_interval_secs: settings.passport.default_resend_interval_secs,
        };
        let passport_service: Arc<dyn PassportService> = Arc::new(RealPassportService::new(
            identity, messaging, registry, mutator, store, clock, config,
        ));

        info!(
            %run_id,
            store = %settings.store.backend,
            identity = %settings.identity.backend,
            registry = %settings.registry.backend,
            password = %settings.password.backend,
            messaging = %messaging_settings.backend,
            deliverer = %messaging_settings.deliverer,
            "server started"
        );

        Ok(Self {
            passport_service,
            pool,
        })
    }

    /// Wraps an already-built service; nothing to release on shutdown.
    pub fn from_service(passport_service: Arc<dyn PassportService>) -> Self {
        Self {
            passport_service,
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
