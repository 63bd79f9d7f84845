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

use serde::{Deserialize, Serialize};
use status_streamer::StreamConfig;
use status_transports::{FeedConfig, KafkaConfig, RetryConfig};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) stream_config: StreamConfig,
    pub(crate) kafka_config: KafkaConfig,
    #[serde(default)]
    pub(crate) retry_config: RetryConfig,
    /// Only required when synthetic mode is off.
    #[serde(default)]
    pub(crate) feed_config: Option<FeedConfig>,
}

impl Config {
    pub fn from_json5(contents: &str) -> Result<Self, json5::Error> {
        json5::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use status_streamer::ReconnectPolicy;

    const DEFAULT_CONFIG: &str = include_str!("../config/DEFAULT_CONFIG.json5");

    #[test]
    fn shipped_default_config_parses() {
        let config = Config::from_json5(DEFAULT_CONFIG).unwrap();

        assert!(config.stream_config.validate().is_ok());
        assert!(!config.stream_config.keywords.is_empty());
        assert!(config.kafka_config.bootstrap_servers.contains(':'));
        assert!(config.feed_config.is_some());
    }

    #[test]
    fn feed_reconnect_policy_is_read() {
        let config = Config::from_json5(
            r#"{
                stream_config: { keywords: ["kafka"], target_topics: ["statuses"] },
                kafka_config: { bootstrap_servers: "localhost:9092", schema_registry_url: "http://localhost:8081" },
                feed_config: {
                    url: "http://localhost:8080/stream",
                    reconnect: { backoff: { max_attempts: 4, delay_ms: 500 } },
                },
            }"#,
        )
        .unwrap();

        let feed = config.feed_config.unwrap();
        assert_eq!(
            feed.reconnect,
            ReconnectPolicy::Backoff {
                max_attempts: 4,
                delay_ms: 500
            }
        );
        assert_eq!(config.retry_config.max_attempts, 3);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let parsed = Config::from_json5(
            r#"{
                stream_config: { keywords: ["kafka"], target_topics: ["statuses"] },
                kafka_config: { bootstrap_servers: "b", schema_registry_url: "r" },
                twitter_config: {},
            }"#,
        );
        assert!(parsed.is_err());
    }
}
