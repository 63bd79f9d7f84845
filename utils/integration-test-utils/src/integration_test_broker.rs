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

use chrono::Utc;
use status_streamer::{ready_delivery, BrokerClient, DeliveryFuture, DeliveryResult, SendError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedSend {
    pub topic: String,
    pub key: i64,
    pub payload: Vec<u8>,
}

/// Broker double that records every send and acknowledges it immediately.
#[derive(Clone, Default)]
pub struct RecordingBrokerClient {
    sends: Arc<Mutex<Vec<RecordedSend>>>,
    closes: Arc<AtomicUsize>,
    fail_deliveries: Arc<AtomicBool>,
}

impl RecordingBrokerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later delivery resolves with a broker error.
    pub fn fail_deliveries(&self) {
        self.fail_deliveries.store(true, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<RecordedSend> {
        self.sends.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl BrokerClient for RecordingBrokerClient {
    fn send_async(&self, topic: &str, key: i64, payload: &[u8]) -> DeliveryFuture {
        let offset = {
            let mut sends = self.sends.lock().unwrap();
            sends.push(RecordedSend {
                topic: topic.to_string(),
                key,
                payload: payload.to_vec(),
            });
            sends.len() as i64 - 1
        };
        debug!("recording broker: send #{offset} on {topic} with key {key}");

        if self.fail_deliveries.load(Ordering::SeqCst) {
            return ready_delivery(Err(SendError::Broker(format!(
                "scripted failure for offset {offset}"
            ))));
        }

        ready_delivery(Ok(DeliveryResult {
            topic: topic.to_string(),
            partition: 0,
            offset,
            timestamp: Some(Utc::now().timestamp_millis()),
            completed_at: Utc::now(),
        }))
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
