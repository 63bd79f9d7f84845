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

//! Topic provisioning and schema registry probing against a Kafka cluster.

use crate::events;
use crate::kafka_config::KafkaConfig;
use crate::retry::{retry_with_backoff, RetryConfig};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::types::RDKafkaErrorCode;
use status_streamer::{InitError, StreamInitializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const COMPONENT: &str = "kafka_initializer";

pub struct KafkaStreamInitializer {
    admin: Arc<AdminClient<DefaultClientContext>>,
    http: reqwest::Client,
    topics: Vec<String>,
    partitions: i32,
    replication_factor: i32,
    registry_url: String,
    operation_timeout: Duration,
    retry: RetryConfig,
}

impl KafkaStreamInitializer {
    pub fn new(
        config: &KafkaConfig,
        topics: Vec<String>,
        retry: RetryConfig,
    ) -> Result<Self, InitError> {
        let admin: AdminClient<DefaultClientContext> = config
            .client_config()
            .create()
            .map_err(|err| InitError::Client(format!("admin client: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(config.admin_timeout())
            .build()
            .map_err(|err| InitError::Client(format!("registry client: {err}")))?;

        Ok(Self {
            admin: Arc::new(admin),
            http,
            topics,
            partitions: config.num_of_partitions,
            replication_factor: config.replication_factor,
            registry_url: config.schema_registry_url.trim_end_matches('/').to_string(),
            operation_timeout: config.admin_timeout(),
            retry,
        })
    }

    fn provisioning_error(&self, reason: String) -> InitError {
        InitError::TopicProvisioning {
            topics: self.topics.clone(),
            reason,
        }
    }

    async fn create_topics(&self) -> Result<(), String> {
        let new_topics: Vec<NewTopic> = self
            .topics
            .iter()
            .map(|topic| {
                NewTopic::new(
                    topic,
                    self.partitions,
                    TopicReplication::Fixed(self.replication_factor),
                )
            })
            .collect();
        let options = AdminOptions::new().operation_timeout(Some(self.operation_timeout));

        let results = self
            .admin
            .create_topics(&new_topics, &options)
            .await
            .map_err(|err| err.to_string())?;

        for result in results {
            match result {
                Ok(topic) => info!(
                    event = events::TOPIC_CREATED,
                    component = COMPONENT,
                    topic = topic.as_str(),
                    partitions = self.partitions,
                    replication_factor = self.replication_factor,
                    "topic created"
                ),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => debug!(
                    event = events::TOPIC_EXISTS,
                    component = COMPONENT,
                    topic = topic.as_str(),
                    "topic already exists"
                ),
                Err((topic, code)) => return Err(format!("{topic}: {code}")),
            }
        }
        Ok(())
    }

    async fn verify_topics(&self) -> Result<(), String> {
        let admin = self.admin.clone();
        let topics = self.topics.clone();
        let timeout = self.operation_timeout;

        // Metadata requests block the calling thread.
        let missing = tokio::task::spawn_blocking(move || {
            let metadata = admin
                .inner()
                .fetch_metadata(None, timeout)
                .map_err(|err| err.to_string())?;
            Ok::<_, String>(missing_topics(
                &topics,
                metadata
                    .topics()
                    .iter()
                    .filter(|topic| topic.error().is_none())
                    .map(|topic| topic.name()),
            ))
        })
        .await
        .map_err(|err| err.to_string())??;

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("topics not yet visible in cluster metadata: {missing:?}"))
        }
    }
}

async fn list_registry_subjects(http: &reqwest::Client, registry_url: &str) -> Result<(), String> {
    let url = format!("{registry_url}/subjects");
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|err| err.to_string())?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("GET {url} returned {status}"))
    }
}

/// Calls `GET {registry_url}/subjects` until it answers 2xx or `retry` is spent.
pub(crate) async fn check_registry(
    http: &reqwest::Client,
    registry_url: &str,
    retry: &RetryConfig,
) -> Result<(), InitError> {
    retry_with_backoff(retry, "list_registry_subjects", || {
        list_registry_subjects(http, registry_url)
    })
    .await
    .map_err(|reason| InitError::RegistryUnreachable {
        url: registry_url.to_string(),
        reason,
    })?;

    info!(
        event = events::REGISTRY_REACHABLE,
        component = COMPONENT,
        url = registry_url,
        "schema registry reachable"
    );
    Ok(())
}

fn missing_topics<'a>(wanted: &[String], present: impl Iterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = present.collect();
    wanted
        .iter()
        .filter(|topic| !present.contains(&topic.as_str()))
        .cloned()
        .collect()
}

#[async_trait]
impl StreamInitializer for KafkaStreamInitializer {
    async fn ensure_topics_exist(&self) -> Result<(), InitError> {
        retry_with_backoff(&self.retry, "create_topics", move || self.create_topics())
            .await
            .map_err(|reason| self.provisioning_error(reason))?;
        retry_with_backoff(&self.retry, "verify_topics", move || self.verify_topics())
            .await
            .map_err(|reason| self.provisioning_error(reason))?;

        info!(
            event = events::TOPICS_VERIFIED,
            component = COMPONENT,
            topics = ?self.topics,
            "topics ready for operations"
        );
        Ok(())
    }

    async fn check_registry_reachable(&self) -> Result<(), InitError> {
        check_registry(&self.http, &self.registry_url, &self.retry).await
    }
}
