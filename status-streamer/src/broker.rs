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

use crate::error::SendError;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

/// Broker acknowledgment metadata for one delivered message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryResult {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Record timestamp in epoch milliseconds, when known.
    ///
    /// This is the timestamp the record was produced with (CreateTime). Topics
    /// configured for LogAppendTime store the broker's append time instead.
    pub timestamp: Option<i64>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one asynchronous send, resolved by the broker client.
pub type DeliveryFuture = BoxFuture<'static, Result<DeliveryResult, SendError>>;

///
/// [`BrokerClient`] is the producer-side boundary to the message broker.
///
/// `send_async` must only enqueue the record and return; the broker client is
/// responsible for driving the returned [`DeliveryFuture`] to completion.
/// `close` releases the underlying connection and is called at most once by
/// [`AsyncPublisher`][crate::AsyncPublisher].
///
pub trait BrokerClient: Send + Sync {
    fn send_async(&self, topic: &str, key: i64, payload: &[u8]) -> DeliveryFuture;

    fn close(&self);
}
