mod code_deliverer_kafka;

pub use code_deliverer_kafka::*;
