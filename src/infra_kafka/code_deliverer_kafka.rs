use crate::domain_port::{CodeDeliverer, CodeDelivery};
use rdkafka::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Publishes deliveries as JSON, keyed by member, for the notification gateway.
pub struct KafkaCodeDeliverer {
    inner: FutureProducer,
    topic: String,
}

impl KafkaCodeDeliverer {
    pub fn new(bootstrap_server: &str, client_id: &str, topic: &str) -> anyhow::Result<Self> {
        let inner = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_server)
            .set("client.id", client_id)
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("max.in.flight.requests.per.connection", "1")
            .set("compression.type", "lz4")
            .create()?;
        Ok(Self {
            inner,
            topic: topic.to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl CodeDeliverer for KafkaCodeDeliverer {
    async fn deliver(&self, delivery: &CodeDelivery) -> anyhow::Result<()> {
        let key = delivery.member_id.to_string();
        let payload = serde_json::to_vec(delivery)?;
        let rec = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        self.inner
            .send(rec, Duration::from_secs(10))
            .await
            .map(|_delivery_report| ())
            .map_err(|(e, _msg)| anyhow::anyhow!(e))
    }
}
