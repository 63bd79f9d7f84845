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

//! Fire-and-forget publishing with per-message delivery reporting.

use crate::broker::{BrokerClient, DeliveryFuture, DeliveryResult};
use crate::error::SendError;
use crate::observability::{events, fields};
use crate::status_event::OutboundMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "publisher";

/// Running totals of publish outcomes.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    accepted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

impl DeliveryStats {
    /// Messages handed to the broker client.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Messages refused before reaching the broker client.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Delivery outcomes still outstanding.
    pub fn in_flight(&self) -> u64 {
        self.accepted().saturating_sub(self.delivered() + self.failed())
    }
}

struct PublisherState {
    client: Option<Arc<dyn BrokerClient>>,
    closed: bool,
}

///
/// [`AsyncPublisher`] owns the broker client and turns each send into a
/// non-blocking enqueue plus a completion task.
///
/// Completion tasks run on `callback_runtime` and only log the outcome; a
/// failed delivery never reaches the caller and never halts the stream.
/// `close` releases the client exactly once no matter how often it is called.
///
pub struct AsyncPublisher {
    state: Mutex<PublisherState>,
    callback_runtime: Handle,
    stats: Arc<DeliveryStats>,
}

impl AsyncPublisher {
    pub fn new(client: Arc<dyn BrokerClient>, callback_runtime: Handle) -> Self {
        Self::with_client(Some(client), callback_runtime)
    }

    /// Publisher that never connected, e.g. when startup failed before the
    /// broker client was built.
    pub fn unconnected(callback_runtime: Handle) -> Self {
        Self::with_client(None, callback_runtime)
    }

    fn with_client(client: Option<Arc<dyn BrokerClient>>, callback_runtime: Handle) -> Self {
        Self {
            state: Mutex::new(PublisherState {
                client,
                closed: false,
            }),
            callback_runtime,
            stats: Arc::new(DeliveryStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<DeliveryStats> {
        self.stats.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    fn lock_state(&self) -> MutexGuard<'_, PublisherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `message` on `topic` and returns without waiting for the broker.
    pub fn send(&self, topic: &str, message: OutboundMessage) -> Result<(), SendError> {
        let delivery = {
            let state = self.lock_state();
            let client = match (&state.client, state.closed) {
                (_, true) => return Err(self.reject(topic, &message, SendError::PublisherClosed)),
                (None, false) => return Err(self.reject(topic, &message, SendError::NotConnected)),
                (Some(client), false) => client.clone(),
            };

            info!(
                event = events::PUBLISH_ATTEMPT,
                component = COMPONENT,
                topic,
                record = fields::format_message(&message).as_str(),
                "sending message"
            );

            client.send_async(topic, message.key, &message.payload)
        };

        self.stats.accepted.fetch_add(1, Ordering::Relaxed);

        let stats = self.stats.clone();
        let topic = topic.to_string();
        self.callback_runtime.spawn(async move {
            Self::complete_delivery(&stats, &topic, &message, delivery.await);
        });

        Ok(())
    }

    fn reject(&self, topic: &str, message: &OutboundMessage, err: SendError) -> SendError {
        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(
            event = events::PUBLISH_REJECTED,
            component = COMPONENT,
            topic,
            record = fields::format_message(message).as_str(),
            err = %err,
            "message was not sent"
        );
        err
    }

    pub(crate) fn complete_delivery(
        stats: &DeliveryStats,
        topic: &str,
        message: &OutboundMessage,
        outcome: Result<DeliveryResult, SendError>,
    ) {
        match outcome {
            Ok(result) => {
                stats.delivered.fetch_add(1, Ordering::Relaxed);
                info!(
                    event = events::DELIVERY_OK,
                    component = COMPONENT,
                    topic = result.topic.as_str(),
                    partition = result.partition,
                    offset = result.offset,
                    timestamp = fields::format_optional_timestamp(result.timestamp).as_str(),
                    completed_at = %result.completed_at.to_rfc3339(),
                    "message delivered"
                );
            }
            Err(err) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    event = events::DELIVERY_FAILED,
                    component = COMPONENT,
                    topic,
                    record = fields::format_message(message).as_str(),
                    err = %err,
                    "message delivery failed"
                );
            }
        }
    }

    /// Releases the broker client. Later calls and sends are no-ops or rejections.
    pub fn close(&self) {
        let client = {
            let mut state = self.lock_state();
            if state.closed {
                debug!(
                    event = events::PUBLISHER_CLOSE_SKIPPED,
                    component = COMPONENT,
                    reason = fields::REASON_ALREADY_CLOSED,
                    "publisher already closed"
                );
                return;
            }
            state.closed = true;
            state.client.take()
        };

        match client {
            Some(client) => {
                info!(
                    event = events::PUBLISHER_CLOSE,
                    component = COMPONENT,
                    in_flight = self.stats.in_flight(),
                    "closing broker client"
                );
                client.close();
            }
            None => {
                debug!(
                    event = events::PUBLISHER_CLOSE_SKIPPED,
                    component = COMPONENT,
                    reason = fields::REASON_NEVER_CONNECTED,
                    "publisher never connected"
                );
            }
        }
    }
}

impl Drop for AsyncPublisher {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolves immediately with `outcome`; handy for broker clients that learn
/// the result synchronously.
pub fn ready_delivery(outcome: Result<DeliveryResult, SendError>) -> DeliveryFuture {
    Box::pin(futures::future::ready(outcome))
}

#[cfg(test)]
mod tests {
    use super::{ready_delivery, AsyncPublisher, DeliveryStats};
    use crate::broker::{BrokerClient, DeliveryFuture, DeliveryResult};
    use crate::error::SendError;
    use crate::status_event::OutboundMessage;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingBroker {
        sends: AtomicUsize,
        closes: AtomicUsize,
        fail: bool,
    }

    impl BrokerClient for CountingBroker {
        fn send_async(&self, topic: &str, _key: i64, _payload: &[u8]) -> DeliveryFuture {
            let offset = self.sends.fetch_add(1, Ordering::SeqCst) as i64;
            if self.fail {
                return ready_delivery(Err(SendError::Broker("leader not available".to_string())));
            }
            ready_delivery(Ok(DeliveryResult {
                topic: topic.to_string(),
                partition: 0,
                offset,
                timestamp: None,
                completed_at: Utc::now(),
            }))
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs<F: FnOnce()>(run: F) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        logs.contents()
    }

    fn message(key: i64) -> OutboundMessage {
        OutboundMessage {
            key,
            payload: format!(r#"{{"userId":{key},"text":"kafka"}}"#).into_bytes(),
        }
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !condition() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn close_releases_client_exactly_once() {
        let broker = Arc::new(CountingBroker::default());
        let publisher = AsyncPublisher::new(broker.clone(), tokio::runtime::Handle::current());

        publisher.close();
        publisher.close();
        drop(publisher);

        assert_eq!(broker.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closing_unconnected_publisher_is_a_noop() {
        let publisher = AsyncPublisher::unconnected(tokio::runtime::Handle::current());

        publisher.close();
        assert!(publisher.is_closed());
        assert_eq!(
            publisher.send("status-topic", message(1)),
            Err(SendError::PublisherClosed)
        );
    }

    #[tokio::test]
    async fn unconnected_publisher_rejects_sends() {
        let publisher = AsyncPublisher::unconnected(tokio::runtime::Handle::current());

        assert_eq!(
            publisher.send("status-topic", message(1)),
            Err(SendError::NotConnected)
        );
        assert_eq!(publisher.stats().rejected(), 1);
    }

    #[tokio::test]
    async fn send_after_close_never_reaches_broker() {
        let broker = Arc::new(CountingBroker::default());
        let publisher = AsyncPublisher::new(broker.clone(), tokio::runtime::Handle::current());

        publisher.close();

        assert_eq!(
            publisher.send("status-topic", message(1)),
            Err(SendError::PublisherClosed)
        );
        assert_eq!(broker.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completions_are_counted() {
        let broker = Arc::new(CountingBroker::default());
        let publisher = AsyncPublisher::new(broker.clone(), tokio::runtime::Handle::current());
        let stats = publisher.stats();

        for key in 0..5 {
            publisher.send("status-topic", message(key)).unwrap();
        }
        wait_for(|| stats.delivered() == 5).await;

        assert_eq!(stats.accepted(), 5);
        assert_eq!(stats.delivered(), 5);
        assert_eq!(stats.in_flight(), 0);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_surface_to_caller() {
        let broker = Arc::new(CountingBroker {
            fail: true,
            ..CountingBroker::default()
        });
        let publisher = AsyncPublisher::new(broker.clone(), tokio::runtime::Handle::current());
        let stats = publisher.stats();

        assert!(publisher.send("status-topic", message(1)).is_ok());
        assert!(publisher.send("status-topic", message(2)).is_ok());
        wait_for(|| stats.failed() == 2).await;

        assert_eq!(stats.failed(), 2);
        assert_eq!(broker.sends.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn successful_delivery_logs_broker_metadata() {
        let stats = DeliveryStats::default();
        let result = DeliveryResult {
            topic: "status-topic".to_string(),
            partition: 3,
            offset: 1042,
            timestamp: Some(1_792_418_602_000),
            completed_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 22).unwrap(),
        };

        let logs = capture_logs(|| {
            AsyncPublisher::complete_delivery(&stats, "status-topic", &message(9), Ok(result));
        });

        assert!(logs.contains("delivery_ok"));
        assert!(logs.contains("topic=\"status-topic\""));
        assert!(logs.contains("partition=3"));
        assert!(logs.contains("offset=1042"));
        assert!(logs.contains("1792418602000"));
        assert!(logs.contains("2026-10-19T14:03:22"));
        assert_eq!(stats.delivered(), 1);
    }

    #[test]
    fn failed_delivery_logs_topic_and_message() {
        let stats = DeliveryStats::default();

        let logs = capture_logs(|| {
            AsyncPublisher::complete_delivery(
                &stats,
                "status-topic",
                &message(9),
                Err(SendError::Broker("message too large".to_string())),
            );
        });

        assert!(logs.contains("delivery_failed"));
        assert!(logs.contains("status-topic"));
        assert!(logs.contains("key=9"));
        assert!(logs.contains("message too large"));
        assert_eq!(stats.failed(), 1);
    }
}
