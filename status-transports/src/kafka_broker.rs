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

//! [`BrokerClient`] over an `rdkafka` `FutureProducer`.

use crate::events;
use crate::kafka_config::KafkaConfig;
use chrono::Utc;
use futures::channel::oneshot::Canceled;
use rdkafka::error::KafkaError;
use rdkafka::message::OwnedMessage;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use status_streamer::{ready_delivery, BrokerClient, DeliveryFuture, DeliveryResult, SendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

const COMPONENT: &str = "kafka_broker";

pub struct KafkaBrokerClient {
    producer: FutureProducer,
    flush_timeout: Duration,
    closed: AtomicBool,
}

impl KafkaBrokerClient {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let producer: FutureProducer = config.producer_client_config().create()?;

        info!(
            event = events::PRODUCER_CREATED,
            component = COMPONENT,
            bootstrap_servers = config.bootstrap_servers.as_str(),
            acks = config.producer.acks.as_str(),
            compression_type = config.producer.compression_type.as_str(),
            "kafka producer created"
        );

        Ok(Self {
            producer,
            flush_timeout: Duration::from_millis(config.producer.flush_timeout_ms),
            closed: AtomicBool::new(false),
        })
    }
}

type ProducerOutcome = Result<Result<(i32, i64), (KafkaError, OwnedMessage)>, Canceled>;

/// Maps a producer acknowledgment onto [`DeliveryResult`].
///
/// The reported timestamp is the CreateTime set on the record at enqueue.
/// `FutureProducer` acknowledgments carry only partition and offset, so a
/// topic configured for LogAppendTime stores a later broker time than the
/// one reported here.
fn delivery_outcome(
    topic: String,
    create_time: i64,
    outcome: ProducerOutcome,
) -> Result<DeliveryResult, SendError> {
    match outcome {
        Ok(Ok((partition, offset))) => Ok(DeliveryResult {
            topic,
            partition,
            offset,
            timestamp: Some(create_time),
            completed_at: Utc::now(),
        }),
        Ok(Err((err, _message))) => Err(SendError::Broker(err.to_string())),
        Err(Canceled) => Err(SendError::Canceled),
    }
}

impl BrokerClient for KafkaBrokerClient {
    fn send_async(&self, topic: &str, key: i64, payload: &[u8]) -> DeliveryFuture {
        // 8-byte big-endian, the layout of the broker's standard long serializer.
        let key_bytes = key.to_be_bytes();
        let timestamp = Utc::now().timestamp_millis();
        let record = FutureRecord::to(topic)
            .key(&key_bytes[..])
            .payload(payload)
            .timestamp(timestamp);

        let delivery = match self.producer.send_result(record) {
            Ok(delivery) => delivery,
            Err((err, _record)) => {
                warn!(
                    event = events::PRODUCER_ENQUEUE_FAILED,
                    component = COMPONENT,
                    topic,
                    key,
                    err = %err,
                    "unable to enqueue record"
                );
                return ready_delivery(Err(SendError::Enqueue(err.to_string())));
            }
        };

        let topic = topic.to_string();
        Box::pin(async move { delivery_outcome(topic, timestamp, delivery.await) })
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            event = events::PRODUCER_FLUSH,
            component = COMPONENT,
            in_flight = self.producer.in_flight_count(),
            timeout_ms = self.flush_timeout.as_millis() as u64,
            "flushing kafka producer"
        );
        if let Err(err) = self.producer.flush(self.flush_timeout) {
            error!(
                event = events::PRODUCER_FLUSH_FAILED,
                component = COMPONENT,
                err = %err,
                "kafka producer flush did not complete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::delivery_outcome;
    use futures::channel::oneshot::Canceled;
    use rdkafka::error::KafkaError;
    use rdkafka::message::{OwnedMessage, Timestamp};
    use rdkafka::types::RDKafkaErrorCode;
    use status_streamer::SendError;

    #[test]
    fn acknowledgment_reports_create_time() {
        let result = delivery_outcome("statuses".to_string(), 1_700_000_000_123, Ok(Ok((2, 41))))
            .unwrap();

        assert_eq!(result.topic, "statuses");
        assert_eq!(result.partition, 2);
        assert_eq!(result.offset, 41);
        assert_eq!(result.timestamp, Some(1_700_000_000_123));
    }

    #[test]
    fn broker_rejection_keeps_cause() {
        let message = OwnedMessage::new(
            None,
            None,
            "statuses".to_string(),
            Timestamp::NotAvailable,
            0,
            -1,
            None,
        );
        let err = KafkaError::MessageProduction(RDKafkaErrorCode::MessageSizeTooLarge);

        let result = delivery_outcome("statuses".to_string(), 0, Ok(Err((err, message))));

        assert!(matches!(result, Err(SendError::Broker(cause)) if cause.contains("MessageSizeTooLarge")));
    }

    #[test]
    fn dropped_acknowledgment_is_canceled() {
        assert_eq!(
            delivery_outcome("statuses".to_string(), 0, Err(Canceled)),
            Err(SendError::Canceled)
        );
    }
}
