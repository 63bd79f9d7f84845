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

//! Concrete clients behind the `status-streamer` traits: a Kafka producer, a
//! Kafka topic/schema-registry initializer and a streaming HTTP status feed.

mod events;
mod http_feed;
mod kafka_broker;
mod kafka_config;
mod kafka_initializer;
mod retry;

pub use http_feed::{FeedConfig, FeedLine, HttpStatusFeed, LineBuffer, DEFAULT_MAX_LINE_BYTES};
pub use kafka_broker::KafkaBrokerClient;
pub use kafka_config::{KafkaConfig, ProducerConfig};
pub use kafka_initializer::KafkaStreamInitializer;
pub use retry::{retry_with_backoff, RetryConfig};
