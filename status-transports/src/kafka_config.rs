/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use rdkafka::config::ClientConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cluster, topic layout and producer tuning.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub schema_registry_url: String,
    #[serde(default = "default_num_of_partitions")]
    pub num_of_partitions: i32,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: i32,
    #[serde(default = "default_admin_timeout_ms")]
    pub admin_timeout_ms: u64,
    #[serde(default)]
    pub producer: ProducerConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProducerConfig {
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_compression_type")]
    pub compression_type: String,
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            acks: default_acks(),
            compression_type: default_compression_type(),
            linger_ms: default_linger_ms(),
            batch_size: default_batch_size(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_count: default_retry_count(),
            flush_timeout_ms: default_flush_timeout_ms(),
        }
    }
}

fn default_num_of_partitions() -> i32 {
    3
}

fn default_replication_factor() -> i32 {
    3
}

fn default_admin_timeout_ms() -> u64 {
    10_000
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_compression_type() -> String {
    "snappy".to_string()
}

fn default_linger_ms() -> u64 {
    5
}

fn default_batch_size() -> u32 {
    1_638_400
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_retry_count() -> u32 {
    5
}

fn default_flush_timeout_ms() -> u64 {
    10_000
}

impl KafkaConfig {
    pub fn admin_timeout(&self) -> Duration {
        Duration::from_millis(self.admin_timeout_ms)
    }

    /// Base client settings shared by the producer and the admin client.
    pub fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config.set("bootstrap.servers", &self.bootstrap_servers);
        client_config
    }

    pub fn producer_client_config(&self) -> ClientConfig {
        let producer = &self.producer;
        let mut client_config = self.client_config();
        client_config
            .set("acks", &producer.acks)
            .set("compression.type", &producer.compression_type)
            .set("linger.ms", producer.linger_ms.to_string())
            .set("batch.size", producer.batch_size.to_string())
            .set("request.timeout.ms", producer.request_timeout_ms.to_string())
            .set("message.send.max.retries", producer.retry_count.to_string());
        client_config
    }
}

#[cfg(test)]
mod tests {
    use super::{KafkaConfig, ProducerConfig};

    #[test]
    fn producer_section_is_optional() {
        let config: KafkaConfig = serde_json::from_str(
            r#"{ "bootstrap_servers": "localhost:9092", "schema_registry_url": "http://localhost:8081" }"#,
        )
        .unwrap();

        assert_eq!(config.num_of_partitions, 3);
        assert_eq!(config.replication_factor, 3);
        assert_eq!(config.producer, ProducerConfig::default());
    }

    #[test]
    fn producer_settings_map_to_client_keys() {
        let config: KafkaConfig = serde_json::from_str(
            r#"{ "bootstrap_servers": "b1:9092,b2:9092", "schema_registry_url": "http://r:8081",
                 "producer": { "acks": "1", "compression_type": "lz4", "linger_ms": 20, "retry_count": 2 } }"#,
        )
        .unwrap();
        let client_config = config.producer_client_config();

        assert_eq!(client_config.get("bootstrap.servers"), Some("b1:9092,b2:9092"));
        assert_eq!(client_config.get("acks"), Some("1"));
        assert_eq!(client_config.get("compression.type"), Some("lz4"));
        assert_eq!(client_config.get("linger.ms"), Some("20"));
        assert_eq!(client_config.get("message.send.max.retries"), Some("2"));
        assert_eq!(client_config.get("request.timeout.ms"), Some("60000"));
    }

    #[test]
    fn unknown_producer_keys_are_rejected() {
        let parsed: Result<KafkaConfig, _> = serde_json::from_str(
            r#"{ "bootstrap_servers": "b", "schema_registry_url": "r", "producer": { "ack": "all" } }"#,
        );
        assert!(parsed.is_err());
    }
}
